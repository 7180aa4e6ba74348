use crate::loc;
use indexmap::IndexMap;

/// Represents a
/// [union type](https://spec.graphql.org/October2021/#sec-Unions) defined
/// within some [`Schema`](crate::schema::Schema).
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UnionType {
    pub(crate) def_location: loc::SchemaDefLocation,
    pub(crate) description: Option<String>,
    pub(crate) members: IndexMap<String, loc::SchemaDefLocation>,
    pub(crate) name: String,
}
impl UnionType {
    pub fn def_location(&self) -> &loc::SchemaDefLocation {
        &self.def_location
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the named object type is a member of this union.
    pub fn has_member(&self, type_name: &str) -> bool {
        self.members.contains_key(type_name)
    }

    /// An ordered list of the names of each type defined as a member of this
    /// union.
    ///
    /// The order retains the order in which members were declared on the
    /// union in the schema. Members added by type extensions follow the
    /// members of the original definition.
    pub fn member_type_names(&self) -> Vec<&str> {
        self.members.keys()
            .map(|type_name| type_name.as_str())
            .collect()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}
