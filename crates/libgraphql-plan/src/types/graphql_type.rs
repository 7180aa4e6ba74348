use crate::loc;
use crate::types::EnumType;
use crate::types::InputObjectType;
use crate::types::InterfaceType;
use crate::types::ObjectType;
use crate::types::ScalarType;
use crate::types::UnionType;

/// Represents a defined GraphQL type
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum GraphQLType {
    Bool,
    Enum(EnumType),
    Float,
    ID,
    InputObject(InputObjectType),
    Int,
    Interface(InterfaceType),
    Object(ObjectType),
    Scalar(ScalarType),
    String,
    Union(UnionType),
}
impl GraphQLType {
    /// If this is a [`GraphQLType::Object`], unwrap and return the
    /// [`ObjectType`].
    pub fn as_object(&self) -> Option<&ObjectType> {
        if let Self::Object(obj_type) = self {
            Some(obj_type)
        } else {
            None
        }
    }

    /// If this is a [`GraphQLType::Interface`], unwrap and return the
    /// [`InterfaceType`].
    pub fn as_interface(&self) -> Option<&InterfaceType> {
        if let Self::Interface(iface_type) = self {
            Some(iface_type)
        } else {
            None
        }
    }

    /// If this is a [`GraphQLType::Union`], unwrap and return the
    /// [`UnionType`].
    pub fn as_union(&self) -> Option<&UnionType> {
        if let Self::Union(union_type) = self {
            Some(union_type)
        } else {
            None
        }
    }

    pub fn def_location(&self) -> loc::SchemaDefLocation {
        match self {
            Self::Bool
                | Self::Float
                | Self::ID
                | Self::Int
                | Self::String =>
                loc::SchemaDefLocation::GraphQLBuiltIn,
            Self::Enum(t) => t.def_location.clone(),
            Self::InputObject(t) => t.def_location.clone(),
            Self::Interface(t) => t.def_location.clone(),
            Self::Object(t) => t.def_location.clone(),
            Self::Scalar(t) => t.def_location.clone(),
            Self::Union(t) => t.def_location.clone(),
        }
    }

    /// Interface and union types: the positions a concrete object type must
    /// be resolved for at runtime.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }

    /// Types that require a selection set when selected.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Object(_) | Self::Union(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Bool => "Boolean",
            Self::Float => "Float",
            Self::ID => "ID",
            Self::Int => "Int",
            Self::String => "String",
            Self::Enum(t) => t.name(),
            Self::InputObject(t) => t.name(),
            Self::Interface(t) => t.name(),
            Self::Object(t) => t.name(),
            Self::Scalar(t) => t.name(),
            Self::Union(t) => t.name(),
        }
    }
}
