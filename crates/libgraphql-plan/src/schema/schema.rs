use crate::document::OperationKind;
use crate::schema::SchemaBuilder;
use crate::types::GraphQLType;
use crate::types::ObjectType;
use indexmap::IndexMap;

/// Represents a fully built, typechecked, and immutable GraphQL schema.
///
/// A [`Schema`] is the static half of what an operation is compiled against:
/// it answers "which fields does this type have" and "which concrete object
/// types can this position resolve to".
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Schema {
    /// Interface name -> names of the object types that implement it, in
    /// type-definition order.
    pub(crate) implementations: IndexMap<String, Vec<String>>,
    pub(crate) mutation_type: Option<String>,
    pub(crate) query_type: String,
    pub(crate) subscription_type: Option<String>,
    pub(crate) types: IndexMap<String, GraphQLType>,
}
impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Every type defined in this schema (including built-in scalars), keyed
    /// by name.
    pub fn all_types(&self) -> &IndexMap<String, GraphQLType> {
        &self.types
    }

    /// Whether `object_type_name` is one of the concrete types an
    /// abstract-or-object type named `type_name` can resolve to.
    ///
    /// This is the membership test used to decide whether a fragment's type
    /// condition applies to a concrete type.
    pub fn is_possible_type(&self, type_name: &str, object_type_name: &str) -> bool {
        match self.types.get(type_name) {
            Some(GraphQLType::Object(obj_type)) =>
                obj_type.name() == object_type_name,
            Some(GraphQLType::Interface(iface_type)) =>
                self.implementations
                    .get(iface_type.name())
                    .is_some_and(|impls| impls.iter().any(|name| name == object_type_name)),
            Some(GraphQLType::Union(union_type)) =>
                union_type.has_member(object_type_name),
            _ => false,
        }
    }

    pub fn lookup_type(&self, type_name: &str) -> Option<&GraphQLType> {
        self.types.get(type_name)
    }

    pub fn mutation_type_name(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn object_type(&self, type_name: &str) -> Option<&ObjectType> {
        self.types.get(type_name).and_then(|t| t.as_object())
    }

    /// The concrete [`ObjectType`]s a value of the named type may have at
    /// runtime.
    ///
    /// * An object type yields itself.
    /// * An interface yields each object type that implements it, in the
    ///   order those object types were defined.
    /// * A union yields its members in declaration order.
    /// * Any other (or unknown) type yields nothing.
    pub fn possible_types(&self, type_name: &str) -> Vec<&ObjectType> {
        match self.types.get(type_name) {
            Some(GraphQLType::Object(obj_type)) => vec![obj_type],
            Some(GraphQLType::Interface(iface_type)) =>
                self.implementations
                    .get(iface_type.name())
                    .map(|impls| impls.iter()
                        .filter_map(|name| self.object_type(name))
                        .collect())
                    .unwrap_or_default(),
            Some(GraphQLType::Union(union_type)) =>
                union_type.member_type_names()
                    .into_iter()
                    .filter_map(|name| self.object_type(name))
                    .collect(),
            _ => vec![],
        }
    }

    pub fn query_type_name(&self) -> &str {
        self.query_type.as_str()
    }

    /// The root [`ObjectType`] an operation of the given kind is executed
    /// against, if the schema defines one.
    pub fn root_operation_type(&self, kind: OperationKind) -> Option<&ObjectType> {
        let type_name = match kind {
            OperationKind::Query => Some(self.query_type.as_str()),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }?;
        self.object_type(type_name)
    }

    pub fn subscription_type_name(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }
}
