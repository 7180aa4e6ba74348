use crate::loc;
use crate::types::Field;
use indexmap::IndexMap;

/// Represents an
/// [object type](https://spec.graphql.org/October2021/#sec-Objects) defined
/// within some [`Schema`](crate::schema::Schema).
///
/// Object types are the only *concrete* types: every abstract position in an
/// operation resolves to one of these at runtime.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ObjectType {
    pub(crate) def_location: loc::SchemaDefLocation,
    pub(crate) description: Option<String>,
    pub(crate) fields: IndexMap<String, Field>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) name: String,
}
impl ObjectType {
    /// The [`SchemaDefLocation`](loc::SchemaDefLocation) indicating where
    /// this [`ObjectType`] was defined within the schema.
    pub fn def_location(&self) -> &loc::SchemaDefLocation {
        &self.def_location
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Look up a [`Field`] by name. Includes the implicit `__typename` field.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// The fields defined on this type, in definition order (fields added by
    /// type extensions come after the fields of the original definition).
    pub fn fields(&self) -> &IndexMap<String, Field> {
        &self.fields
    }

    /// Whether this type declares that it implements the named interface.
    pub fn implements(&self, interface_name: &str) -> bool {
        self.interfaces.iter().any(|iface| iface == interface_name)
    }

    /// Names of the interfaces this type declares it implements.
    pub fn interface_names(&self) -> Vec<&str> {
        self.interfaces.iter().map(|s| s.as_str()).collect()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}
