use crate::ast;

/// Represents the annotated type of a [`Field`](crate::types::Field),
/// [`Parameter`](crate::types::Parameter), or operation variable.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum TypeAnnotation {
    List {
        inner: Box<TypeAnnotation>,
        nullable: bool,
    },
    Named {
        nullable: bool,
        type_name: String,
    },
}
impl TypeAnnotation {
    pub(crate) fn from_ast_type(ast_type: &ast::schema::Type) -> Self {
        Self::from_ast_type_impl(ast_type, /* nullable = */ true)
    }

    fn from_ast_type_impl(ast_type: &ast::schema::Type, nullable: bool) -> Self {
        match ast_type {
            ast::schema::Type::ListType(inner) => Self::List {
                inner: Box::new(Self::from_ast_type_impl(inner, true)),
                nullable,
            },

            ast::schema::Type::NamedType(name) => Self::Named {
                nullable,
                type_name: name.to_string(),
            },

            ast::schema::Type::NonNullType(inner) =>
                Self::from_ast_type_impl(inner, false),
        }
    }

    /// Recursively unwrap list wrappers and return the name of the inner-most
    /// named type.
    pub fn innermost_type_name(&self) -> &str {
        match self {
            Self::List { inner, .. } => inner.innermost_type_name(),
            Self::Named { type_name, .. } => type_name.as_str(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List { .. })
    }

    /// Indicates if this [`TypeAnnotation`] is [nullable or
    /// non-nullable](https://spec.graphql.org/October2021/#sec-Non-Null).
    pub fn nullable(&self) -> bool {
        match self {
            Self::List { nullable, .. } => *nullable,
            Self::Named { nullable, .. } => *nullable,
        }
    }
}
impl std::fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List { inner, nullable } => {
                write!(f, "[{inner}]")?;
                if !nullable {
                    write!(f, "!")?;
                }
            },
            Self::Named { nullable, type_name } => {
                write!(f, "{type_name}")?;
                if !nullable {
                    write!(f, "!")?;
                }
            },
        }
        Ok(())
    }
}
