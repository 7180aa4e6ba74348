use crate::ast;
use crate::loc;
use crate::types::Parameter;
use crate::types::TypeAnnotation;
use indexmap::IndexMap;
use std::path::Path;

/// Represents a defined field on an
/// [`ObjectType`](crate::types::ObjectType) or
/// [`InterfaceType`](crate::types::InterfaceType).
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Field {
    pub(crate) def_location: loc::SchemaDefLocation,
    pub(crate) description: Option<String>,
    pub(crate) name: String,
    pub(crate) parameters: IndexMap<String, Parameter>,
    pub(crate) type_annotation: TypeAnnotation,
}
impl Field {
    pub(crate) fn from_ast(file_path: &Path, field: &ast::schema::Field) -> Self {
        Self {
            def_location: loc::FilePosition::from_pos(
                Some(file_path),
                field.position,
            ).into(),
            description: field.description.to_owned(),
            name: field.name.to_string(),
            parameters: field.arguments.iter().map(|input_val| (
                input_val.name.to_string(),
                Parameter::from_ast(file_path, input_val),
            )).collect(),
            type_annotation: TypeAnnotation::from_ast_type(&field.field_type),
        }
    }

    /// The implicit `__typename: String!` meta-field every object and
    /// interface type exposes.
    pub(crate) fn typename() -> Self {
        Self {
            def_location: loc::SchemaDefLocation::GraphQLBuiltIn,
            description: None,
            name: "__typename".to_string(),
            parameters: IndexMap::new(),
            type_annotation: TypeAnnotation::Named {
                nullable: false,
                type_name: "String".to_string(),
            },
        }
    }

    pub fn def_location(&self) -> &loc::SchemaDefLocation {
        &self.def_location
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn parameters(&self) -> &IndexMap<String, Parameter> {
        &self.parameters
    }

    pub fn type_annotation(&self) -> &TypeAnnotation {
        &self.type_annotation
    }
}
