use crate::ast;
use crate::document::OperationKind;
use crate::file_reader;
use crate::loc;
use crate::schema::Schema;
use crate::types::EnumType;
use crate::types::Field;
use crate::types::GraphQLType;
use crate::types::GraphQLTypeKind;
use crate::types::InputObjectType;
use crate::types::InterfaceType;
use crate::types::ObjectType;
use crate::types::Parameter;
use crate::types::ScalarType;
use crate::types::UnionType;
use indexmap::IndexMap;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

type Result<T> = std::result::Result<T, SchemaBuildError>;

const BUILTIN_SCALARS: [(&str, GraphQLType); 5] = [
    ("Boolean", GraphQLType::Bool),
    ("Float", GraphQLType::Float),
    ("ID", GraphQLType::ID),
    ("Int", GraphQLType::Int),
    ("String", GraphQLType::String),
];

/// Utility for building a [`Schema`] from one or more SDL sources.
///
/// Type extensions (`extend type ...`) are collected while loading and
/// applied when [`SchemaBuilder::build()`] is called, so an extension may
/// be loaded before the definition it extends.
#[derive(Debug)]
pub struct SchemaBuilder {
    extensions: Vec<(PathBuf, ast::schema::TypeExtension)>,
    mutation_type: Option<NamedTypeDefLocation>,
    query_type: Option<NamedTypeDefLocation>,
    str_load_counter: u16,
    subscription_type: Option<NamedTypeDefLocation>,
    types: IndexMap<String, GraphQLType>,
}
impl SchemaBuilder {
    /// Consume this [`SchemaBuilder`] to produce a validated [`Schema`].
    pub fn build(mut self) -> Result<Schema> {
        for (file_path, ext) in std::mem::take(&mut self.extensions) {
            self.apply_type_extension(file_path.as_path(), ext)?;
        }

        for graphql_type in self.types.values_mut() {
            match graphql_type {
                GraphQLType::Object(obj_type) => {
                    obj_type.fields.insert("__typename".to_string(), Field::typename());
                },
                GraphQLType::Interface(iface_type) => {
                    iface_type.fields.insert("__typename".to_string(), Field::typename());
                },
                _ => (),
            }
        }

        self.validate_type_references()?;

        let query_type =
            self.resolve_root_type(OperationKind::Query)?
                .ok_or(SchemaBuildError::NoQueryOperationTypeDefined)?;
        let mutation_type = self.resolve_root_type(OperationKind::Mutation)?;
        let subscription_type = self.resolve_root_type(OperationKind::Subscription)?;

        let mut implementations = IndexMap::<String, Vec<String>>::new();
        for graphql_type in self.types.values() {
            match graphql_type {
                GraphQLType::Interface(iface_type) => {
                    implementations.entry(iface_type.name.to_owned()).or_default();
                },
                GraphQLType::Object(obj_type) => {
                    for iface_name in &obj_type.interfaces {
                        implementations
                            .entry(iface_name.to_owned())
                            .or_default()
                            .push(obj_type.name.to_owned());
                    }
                },
                _ => (),
            }
        }

        log::debug!(
            "Built schema with {} types (query root: `{query_type}`).",
            self.types.len(),
        );

        Ok(Schema {
            implementations,
            mutation_type,
            query_type,
            subscription_type,
            types: self.types,
        })
    }

    pub fn from_file(file_path: impl AsRef<Path>) -> Result<Self> {
        Self::new().load_file(file_path)
    }

    pub fn from_files(file_paths: &[impl AsRef<Path>]) -> Result<Self> {
        Self::new().load_files(file_paths)
    }

    pub fn from_str(
        file_path: Option<PathBuf>,
        content: impl AsRef<str>,
    ) -> Result<Self> {
        Self::new().load_str(file_path, content)
    }

    pub fn load_file(self, file_path: impl AsRef<Path>) -> Result<Self> {
        self.load_files(&[file_path])
    }

    pub fn load_files(mut self, file_paths: &[impl AsRef<Path>]) -> Result<Self> {
        for file_path in file_paths {
            let file_path = file_path.as_ref();
            let file_content = file_reader::read_content(file_path)
                .map_err(|err| SchemaBuildError::SchemaFileReadError(
                    Box::new(err),
                ))?;
            self = self.load_str(Some(file_path.to_path_buf()), file_content)?;
        }
        Ok(self)
    }

    pub fn load_str(
        mut self,
        file_path: Option<PathBuf>,
        content: impl AsRef<str>,
    ) -> Result<Self> {
        let file_path =
            if let Some(file_path) = file_path {
                file_path
            } else {
                let ctr = self.str_load_counter;
                self.str_load_counter += 1;
                PathBuf::from(format!("str://{ctr}"))
            };

        let ast_doc =
            ast::schema::parse(content.as_ref())
                .map_err(|err| SchemaBuildError::ParseError {
                    file: file_path.to_owned(),
                    err: err.to_string(),
                })?;

        log::trace!(
            "Loading {} schema definitions from {file_path:?}.",
            ast_doc.definitions.len(),
        );
        for def in ast_doc.definitions {
            self.visit_ast_def(file_path.as_path(), def)?;
        }

        Ok(self)
    }

    pub fn new() -> Self {
        Self {
            extensions: vec![],
            mutation_type: None,
            query_type: None,
            str_load_counter: 0,
            subscription_type: None,
            types: BUILTIN_SCALARS.into_iter()
                .map(|(name, builtin)| (name.to_string(), builtin))
                .collect(),
        }
    }

    fn apply_type_extension(
        &mut self,
        file_path: &Path,
        ext: ast::schema::TypeExtension,
    ) -> Result<()> {
        use ast::schema::TypeExtension;

        let (type_name, position) = match &ext {
            TypeExtension::Enum(ext) => (ext.name.to_owned(), ext.position),
            TypeExtension::InputObject(ext) => (ext.name.to_owned(), ext.position),
            TypeExtension::Interface(ext) => (ext.name.to_owned(), ext.position),
            TypeExtension::Object(ext) => (ext.name.to_owned(), ext.position),
            TypeExtension::Scalar(ext) => (ext.name.to_owned(), ext.position),
            TypeExtension::Union(ext) => (ext.name.to_owned(), ext.position),
        };
        let ext_location: loc::SchemaDefLocation =
            loc::FilePosition::from_pos(Some(file_path), position).into();

        let Some(schema_type) = self.types.get_mut(type_name.as_str()) else {
            return Err(SchemaBuildError::ExtensionOfUndefinedType {
                type_name,
                extension_loc: ext_location,
            });
        };

        match (schema_type, ext) {
            (GraphQLType::Enum(enum_type), TypeExtension::Enum(ext)) => {
                enum_type.values.extend(ext.values.into_iter().map(|v| v.name));
            },

            (GraphQLType::InputObject(inputobj_type), TypeExtension::InputObject(ext)) => {
                for input_val in &ext.fields {
                    inputobj_type.fields.insert(
                        input_val.name.to_string(),
                        Parameter::from_ast(file_path, input_val),
                    );
                }
            },

            (GraphQLType::Interface(iface_type), TypeExtension::Interface(ext)) => {
                add_fields(
                    &iface_type.name,
                    &mut iface_type.fields,
                    file_path,
                    &ext.fields,
                )?;
            },

            (GraphQLType::Object(obj_type), TypeExtension::Object(ext)) => {
                add_fields(
                    &obj_type.name,
                    &mut obj_type.fields,
                    file_path,
                    &ext.fields,
                )?;
                add_interfaces(
                    &obj_type.name,
                    &mut obj_type.interfaces,
                    &ext_location,
                    ext.implements_interfaces,
                )?;
            },

            (GraphQLType::Scalar(_), TypeExtension::Scalar(_)) => (),

            (GraphQLType::Union(union_type), TypeExtension::Union(ext)) => {
                for member_name in ext.types {
                    if union_type.members.contains_key(member_name.as_str()) {
                        return Err(SchemaBuildError::DuplicatedUnionMember {
                            type_name: union_type.name.to_owned(),
                            member_name,
                            location: ext_location,
                        });
                    }
                    union_type.members.insert(member_name, ext_location.to_owned());
                }
            },

            (schema_type, _) => return Err(SchemaBuildError::InvalidExtensionType {
                type_name,
                type_kind: GraphQLTypeKind::from(&*schema_type),
                extension_loc: ext_location,
            }),
        }

        Ok(())
    }

    fn define_type(
        &mut self,
        type_name: &str,
        def_location: &loc::SchemaDefLocation,
        graphql_type: GraphQLType,
    ) -> Result<()> {
        if let Some(existing_type) = self.types.get(type_name) {
            return Err(SchemaBuildError::DuplicateTypeDefinition {
                type_name: type_name.to_string(),
                def1: existing_type.def_location(),
                def2: def_location.to_owned(),
            });
        }
        self.types.insert(type_name.to_string(), graphql_type);
        Ok(())
    }

    fn resolve_root_type(&self, kind: OperationKind) -> Result<Option<String>> {
        let explicit_root = match kind {
            OperationKind::Query => &self.query_type,
            OperationKind::Mutation => &self.mutation_type,
            OperationKind::Subscription => &self.subscription_type,
        };

        let (type_name, location) = match explicit_root {
            Some(typedef_loc) => (
                typedef_loc.type_name.as_str(),
                typedef_loc.def_location.to_owned(),
            ),
            None => match self.types.get(kind.default_root_type_name()) {
                Some(GraphQLType::Object(obj_type)) =>
                    return Ok(Some(obj_type.name.to_owned())),
                _ => return Ok(None),
            },
        };

        match self.types.get(type_name) {
            Some(GraphQLType::Object(_)) => Ok(Some(type_name.to_string())),
            Some(other_type) => Err(SchemaBuildError::InvalidRootOperationType {
                operation: kind,
                type_name: type_name.to_string(),
                type_kind: other_type.into(),
                location,
            }),
            None => Err(SchemaBuildError::UndefinedTypeReference {
                type_name: type_name.to_string(),
                referenced_by: format!("schema.{}", kind.keyword()),
                location,
            }),
        }
    }

    fn validate_type_references(&self) -> Result<()> {
        let check_fields = |owner: &str, fields: &IndexMap<String, Field>| -> Result<()> {
            for field in fields.values() {
                let field_type_name = field.type_annotation.innermost_type_name();
                if !self.types.contains_key(field_type_name) {
                    return Err(SchemaBuildError::UndefinedTypeReference {
                        type_name: field_type_name.to_string(),
                        referenced_by: format!("{owner}.{}", field.name),
                        location: field.def_location.to_owned(),
                    });
                }
            }
            Ok(())
        };

        let check_interfaces = |owner: &str, def_location: &loc::SchemaDefLocation, interfaces: &[String]| -> Result<()> {
            for iface_name in interfaces {
                match self.types.get(iface_name) {
                    Some(GraphQLType::Interface(_)) => (),
                    Some(other_type) => return Err(
                        SchemaBuildError::NonInterfaceImplementsDeclaration {
                            type_name: owner.to_string(),
                            implemented_type_name: iface_name.to_owned(),
                            implemented_type_kind: other_type.into(),
                            location: def_location.to_owned(),
                        }
                    ),
                    None => return Err(SchemaBuildError::UndefinedTypeReference {
                        type_name: iface_name.to_owned(),
                        referenced_by: owner.to_string(),
                        location: def_location.to_owned(),
                    }),
                }
            }
            Ok(())
        };

        for graphql_type in self.types.values() {
            match graphql_type {
                GraphQLType::Interface(iface_type) => {
                    check_fields(&iface_type.name, &iface_type.fields)?;
                    check_interfaces(
                        &iface_type.name,
                        &iface_type.def_location,
                        &iface_type.interfaces,
                    )?;
                },

                GraphQLType::Object(obj_type) => {
                    check_fields(&obj_type.name, &obj_type.fields)?;
                    check_interfaces(
                        &obj_type.name,
                        &obj_type.def_location,
                        &obj_type.interfaces,
                    )?;
                },

                GraphQLType::Union(union_type) => {
                    for (member_name, member_loc) in &union_type.members {
                        match self.types.get(member_name) {
                            Some(GraphQLType::Object(_)) => (),
                            Some(other_type) => return Err(
                                SchemaBuildError::InvalidUnionMember {
                                    type_name: union_type.name.to_owned(),
                                    member_name: member_name.to_owned(),
                                    member_kind: other_type.into(),
                                    location: member_loc.to_owned(),
                                }
                            ),
                            None => return Err(SchemaBuildError::UndefinedTypeReference {
                                type_name: member_name.to_owned(),
                                referenced_by: union_type.name.to_owned(),
                                location: member_loc.to_owned(),
                            }),
                        }
                    }
                },

                _ => (),
            }
        }

        Ok(())
    }

    fn visit_ast_def(
        &mut self,
        file_path: &Path,
        def: ast::schema::Definition,
    ) -> Result<()> {
        use ast::schema::Definition;
        match def {
            Definition::SchemaDefinition(schema_def) =>
                self.visit_ast_schemablock_def(file_path, schema_def),
            Definition::TypeDefinition(type_def) =>
                self.visit_ast_type_def(file_path, type_def),
            Definition::TypeExtension(type_ext) => {
                self.extensions.push((file_path.to_path_buf(), type_ext));
                Ok(())
            },
            // Custom directive definitions have no bearing on planning: only
            // the built-in @skip/@include/@defer are interpreted.
            Definition::DirectiveDefinition(_) => Ok(()),
        }
    }

    fn visit_ast_schemablock_def(
        &mut self,
        file_path: &Path,
        schema_def: ast::schema::SchemaDefinition,
    ) -> Result<()> {
        let roots = [
            (OperationKind::Query, schema_def.query),
            (OperationKind::Mutation, schema_def.mutation),
            (OperationKind::Subscription, schema_def.subscription),
        ];

        for (kind, type_name) in roots {
            let Some(type_name) = type_name else {
                continue
            };

            let typedef_loc = NamedTypeDefLocation::from_pos(
                type_name,
                file_path,
                schema_def.position,
            );
            let slot = match kind {
                OperationKind::Query => &mut self.query_type,
                OperationKind::Mutation => &mut self.mutation_type,
                OperationKind::Subscription => &mut self.subscription_type,
            };
            if let Some(existing_typedef_loc) = slot {
                return Err(SchemaBuildError::DuplicateOperationDefinition {
                    operation: kind,
                    location1: existing_typedef_loc.clone(),
                    location2: typedef_loc,
                });
            }
            *slot = Some(typedef_loc);
        }

        Ok(())
    }

    fn visit_ast_type_def(
        &mut self,
        file_path: &Path,
        type_def: ast::schema::TypeDefinition,
    ) -> Result<()> {
        use ast::schema::TypeDefinition;

        match type_def {
            TypeDefinition::Enum(enum_def) => {
                let def_location: loc::SchemaDefLocation =
                    loc::FilePosition::from_pos(Some(file_path), enum_def.position).into();
                self.define_type(&enum_def.name, &def_location, GraphQLType::Enum(EnumType {
                    def_location: def_location.to_owned(),
                    description: enum_def.description,
                    name: enum_def.name.to_owned(),
                    values: enum_def.values.into_iter().map(|v| v.name).collect(),
                }))
            },

            TypeDefinition::InputObject(inputobj_def) => {
                let def_location: loc::SchemaDefLocation =
                    loc::FilePosition::from_pos(Some(file_path), inputobj_def.position).into();
                let fields = inputobj_def.fields.iter()
                    .map(|input_val| (
                        input_val.name.to_string(),
                        Parameter::from_ast(file_path, input_val),
                    ))
                    .collect();
                self.define_type(&inputobj_def.name, &def_location, GraphQLType::InputObject(
                    InputObjectType {
                        def_location: def_location.to_owned(),
                        description: inputobj_def.description,
                        fields,
                        name: inputobj_def.name.to_owned(),
                    }
                ))
            },

            TypeDefinition::Interface(iface_def) => {
                let def_location: loc::SchemaDefLocation =
                    loc::FilePosition::from_pos(Some(file_path), iface_def.position).into();
                let mut fields = IndexMap::new();
                add_fields(&iface_def.name, &mut fields, file_path, &iface_def.fields)?;
                let mut interfaces = vec![];
                add_interfaces(
                    &iface_def.name,
                    &mut interfaces,
                    &def_location,
                    iface_def.implements_interfaces,
                )?;
                self.define_type(&iface_def.name, &def_location, GraphQLType::Interface(
                    InterfaceType {
                        def_location: def_location.to_owned(),
                        description: iface_def.description,
                        fields,
                        interfaces,
                        name: iface_def.name.to_owned(),
                    }
                ))
            },

            TypeDefinition::Object(obj_def) => {
                let def_location: loc::SchemaDefLocation =
                    loc::FilePosition::from_pos(Some(file_path), obj_def.position).into();
                let mut fields = IndexMap::new();
                add_fields(&obj_def.name, &mut fields, file_path, &obj_def.fields)?;
                let mut interfaces = vec![];
                add_interfaces(
                    &obj_def.name,
                    &mut interfaces,
                    &def_location,
                    obj_def.implements_interfaces,
                )?;
                self.define_type(&obj_def.name, &def_location, GraphQLType::Object(
                    ObjectType {
                        def_location: def_location.to_owned(),
                        description: obj_def.description,
                        fields,
                        interfaces,
                        name: obj_def.name.to_owned(),
                    }
                ))
            },

            TypeDefinition::Scalar(scalar_def) => {
                // Some SDL dumps re-declare the built-in scalars.
                if BUILTIN_SCALARS.iter().any(|(name, _)| *name == scalar_def.name) {
                    return Ok(());
                }
                let def_location: loc::SchemaDefLocation =
                    loc::FilePosition::from_pos(Some(file_path), scalar_def.position).into();
                self.define_type(&scalar_def.name, &def_location, GraphQLType::Scalar(
                    ScalarType {
                        def_location: def_location.to_owned(),
                        description: scalar_def.description,
                        name: scalar_def.name.to_owned(),
                    }
                ))
            },

            TypeDefinition::Union(union_def) => {
                let def_location: loc::SchemaDefLocation =
                    loc::FilePosition::from_pos(Some(file_path), union_def.position).into();
                let mut members = IndexMap::new();
                for member_name in union_def.types {
                    if members.contains_key(member_name.as_str()) {
                        return Err(SchemaBuildError::DuplicatedUnionMember {
                            type_name: union_def.name,
                            member_name,
                            location: def_location,
                        });
                    }
                    members.insert(member_name, def_location.to_owned());
                }
                self.define_type(&union_def.name, &def_location, GraphQLType::Union(
                    UnionType {
                        def_location: def_location.to_owned(),
                        description: union_def.description,
                        members,
                        name: union_def.name.to_owned(),
                    }
                ))
            },
        }
    }
}
impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn add_fields(
    type_name: &str,
    fields: &mut IndexMap<String, Field>,
    file_path: &Path,
    ast_fields: &[ast::schema::Field],
) -> Result<()> {
    for ast_field in ast_fields {
        let field = Field::from_ast(file_path, ast_field);
        if let Some(existing_field) = fields.get(field.name()) {
            return Err(SchemaBuildError::DuplicateFieldDefinition {
                type_name: type_name.to_string(),
                field_name: field.name.to_owned(),
                field_def1: existing_field.def_location.to_owned(),
                field_def2: field.def_location,
            });
        }
        fields.insert(field.name.to_owned(), field);
    }
    Ok(())
}

fn add_interfaces(
    type_name: &str,
    interfaces: &mut Vec<String>,
    def_location: &loc::SchemaDefLocation,
    ast_interfaces: Vec<String>,
) -> Result<()> {
    for iface_name in ast_interfaces {
        if interfaces.contains(&iface_name) {
            return Err(SchemaBuildError::DuplicateInterfaceImplementsDeclaration {
                def_location: def_location.to_owned(),
                duplicated_interface_name: iface_name,
                type_name: type_name.to_string(),
            });
        }
        interfaces.push(iface_name);
    }
    Ok(())
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaBuildError {
    #[error(
        "The `{type_name}` type declares that it implements the \
        `{duplicated_interface_name}` interface more than once"
    )]
    DuplicateInterfaceImplementsDeclaration {
        def_location: loc::SchemaDefLocation,
        duplicated_interface_name: String,
        type_name: String,
    },

    #[error("Multiple fields named `{field_name}` were defined on the `{type_name}` type")]
    DuplicateFieldDefinition {
        type_name: String,
        field_name: String,
        field_def1: loc::SchemaDefLocation,
        field_def2: loc::SchemaDefLocation,
    },

    #[error("Multiple {operation:?} root operation types were defined")]
    DuplicateOperationDefinition {
        operation: OperationKind,
        location1: NamedTypeDefLocation,
        location2: NamedTypeDefLocation,
    },

    #[error("Multiple GraphQL types named `{type_name}` were defined")]
    DuplicateTypeDefinition {
        type_name: String,
        def1: loc::SchemaDefLocation,
        def2: loc::SchemaDefLocation,
    },

    #[error("The `{type_name}` union lists `{member_name}` as a member more than once")]
    DuplicatedUnionMember {
        type_name: String,
        member_name: String,
        location: loc::SchemaDefLocation,
    },

    #[error("Attempted to extend `{type_name}`, which is not defined")]
    ExtensionOfUndefinedType {
        type_name: String,
        extension_loc: loc::SchemaDefLocation,
    },

    #[error("Attempted to extend `{type_name}` ({type_kind}) with an extension of a different kind of type")]
    InvalidExtensionType {
        type_name: String,
        type_kind: GraphQLTypeKind,
        extension_loc: loc::SchemaDefLocation,
    },

    #[error("The {operation:?} root operation type `{type_name}` must be an object type, but it is a {type_kind}")]
    InvalidRootOperationType {
        operation: OperationKind,
        type_name: String,
        type_kind: GraphQLTypeKind,
        location: loc::SchemaDefLocation,
    },

    #[error("The `{type_name}` union may only contain object types, but `{member_name}` is a {member_kind}")]
    InvalidUnionMember {
        type_name: String,
        member_name: String,
        member_kind: GraphQLTypeKind,
        location: loc::SchemaDefLocation,
    },

    #[error("Attempted to build a schema that has no Query operation type defined")]
    NoQueryOperationTypeDefined,

    #[error(
        "The `{type_name}` type declares that it implements \
        `{implemented_type_name}`, which is a {implemented_type_kind} rather \
        than an interface"
    )]
    NonInterfaceImplementsDeclaration {
        type_name: String,
        implemented_type_name: String,
        implemented_type_kind: GraphQLTypeKind,
        location: loc::SchemaDefLocation,
    },

    #[error("Error parsing schema file {file:?}: {err}")]
    ParseError {
        file: PathBuf,
        err: String,
    },

    #[error("Failure while trying to read a schema file from disk")]
    SchemaFileReadError(Box<file_reader::ReadContentError>),

    #[error("`{referenced_by}` references the undefined type `{type_name}`")]
    UndefinedTypeReference {
        type_name: String,
        referenced_by: String,
        location: loc::SchemaDefLocation,
    },
}

/// Represents the file location of a root operation type declared in a
/// `schema { ... }` block.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedTypeDefLocation {
    pub def_location: loc::SchemaDefLocation,
    pub type_name: String,
}
impl NamedTypeDefLocation {
    pub(crate) fn from_pos(
        type_name: String,
        file: &Path,
        pos: graphql_parser::Pos,
    ) -> Self {
        Self {
            def_location: loc::FilePosition::from_pos(Some(file), pos).into(),
            type_name,
        }
    }
}
