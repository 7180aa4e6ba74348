use crate::ast;
use crate::document::ExecutableDocument;
use crate::document::FragmentDefinitionNode;
use crate::document::OperationDefinitionNode;
use crate::document::OperationKind;
use crate::document::SyntaxArena;
use crate::document::VariableDefinitionNode;
use crate::file_reader;
use crate::loc;
use crate::types::TypeAnnotation;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

type Result<T> = std::result::Result<T, Vec<ExecutableDocumentBuildError>>;

/// Parses GraphQL executable syntax and lowers it into an
/// [`ExecutableDocument`].
///
/// The GraphQL spec requires every operation in a multi-operation document
/// to be named, and that names are unique. Both are enforced here because
/// an operation is later selected by name. Everything else about the
/// document is assumed to have been validated against its schema upstream.
#[derive(Debug)]
pub struct ExecutableDocumentBuilder {
    ast: ast::operation::Document,
    file_path: Option<PathBuf>,
}
impl ExecutableDocumentBuilder {
    pub fn build(self) -> Result<ExecutableDocument> {
        let mut errors = vec![];
        let mut fragments = vec![];
        let mut operations: Vec<OperationDefinitionNode> = vec![];
        let mut syntax = SyntaxArena::for_document(self.file_path);

        for def in &self.ast.definitions {
            use ast::operation::Definition;
            match def {
                Definition::Fragment(frag_def) => {
                    let selection_set = syntax.lower_selection_set(&frag_def.selection_set);
                    let ast::operation::TypeCondition::On(type_condition) =
                        &frag_def.type_condition;
                    fragments.push(FragmentDefinitionNode {
                        directives: syntax.lower_directives(&frag_def.directives),
                        location: syntax.location(frag_def.position),
                        name: frag_def.name.to_owned(),
                        selection_set,
                        type_condition: type_condition.to_owned(),
                    });
                },

                Definition::Operation(op_def) => {
                    let operation = lower_operation(&mut syntax, op_def);
                    if let Some(name) = operation.name() {
                        let existing = operations.iter()
                            .find(|op| op.name() == Some(name));
                        if let Some(existing) = existing {
                            errors.push(ExecutableDocumentBuildError::DuplicateOperationName {
                                operation_name: name.to_string(),
                                location1: existing.location.to_owned(),
                                location2: operation.location.to_owned(),
                            });
                        }
                    }
                    operations.push(operation);
                },
            }
        }

        if operations.len() > 1 {
            for operation in operations.iter().filter(|op| op.name.is_none()) {
                errors.push(ExecutableDocumentBuildError::MultipleAnonymousOperations {
                    location: operation.location.to_owned(),
                });
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        log::trace!(
            "Lowered executable document with {} operation(s) and {} fragment(s).",
            operations.len(),
            fragments.len(),
        );

        Ok(ExecutableDocument {
            fragments,
            operations,
            syntax,
        })
    }

    pub fn from_ast(
        ast: ast::operation::Document,
        file_path: Option<&Path>,
    ) -> Self {
        Self {
            ast,
            file_path: file_path.map(|p| p.to_path_buf()),
        }
    }

    pub fn from_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref();
        let file_content = file_reader::read_content(file_path)
            .map_err(|err| vec![
                ExecutableDocumentBuildError::FileReadError(Box::new(err)),
            ])?;
        Self::from_str(file_content, Some(file_path))
    }

    pub fn from_str(
        content: impl AsRef<str>,
        file_path: Option<&Path>,
    ) -> Result<Self> {
        let ast_doc =
            ast::operation::parse(content.as_ref())
                .map_err(|err| vec![ExecutableDocumentBuildError::ParseError {
                    file: file_path.map(|p| p.to_path_buf()),
                    err: err.to_string(),
                }])?;
        Ok(Self::from_ast(ast_doc, file_path))
    }
}

fn lower_operation(
    syntax: &mut SyntaxArena,
    op_def: &ast::operation::OperationDefinition,
) -> OperationDefinitionNode {
    use ast::operation::OperationDefinition as OpDef;

    let (kind, name, variable_definitions, directives, selection_set, position) = match op_def {
        OpDef::Query(query) => (
            OperationKind::Query,
            query.name.as_ref(),
            query.variable_definitions.as_slice(),
            query.directives.as_slice(),
            &query.selection_set,
            query.position,
        ),
        OpDef::Mutation(mutation) => (
            OperationKind::Mutation,
            mutation.name.as_ref(),
            mutation.variable_definitions.as_slice(),
            mutation.directives.as_slice(),
            &mutation.selection_set,
            mutation.position,
        ),
        OpDef::Subscription(subscription) => (
            OperationKind::Subscription,
            subscription.name.as_ref(),
            subscription.variable_definitions.as_slice(),
            subscription.directives.as_slice(),
            &subscription.selection_set,
            subscription.position,
        ),
        OpDef::SelectionSet(selection_set) => (
            OperationKind::Query,
            None,
            &[][..],
            &[][..],
            selection_set,
            selection_set.span.0,
        ),
    };

    let selection_set = syntax.lower_selection_set(selection_set);
    OperationDefinitionNode {
        directives: syntax.lower_directives(directives),
        kind,
        location: syntax.location(position),
        name: name.cloned(),
        selection_set,
        variable_definitions: variable_definitions.iter().map(|var_def| {
            VariableDefinitionNode {
                default_value: var_def.default_value.to_owned(),
                location: syntax.location(var_def.position),
                name: var_def.name.to_owned(),
                type_annotation: TypeAnnotation::from_ast_type(&var_def.var_type),
            }
        }).collect(),
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ExecutableDocumentBuildError {
    #[error("Multiple operations named `{operation_name}` were defined")]
    DuplicateOperationName {
        operation_name: String,
        location1: loc::SourceLocation,
        location2: loc::SourceLocation,
    },

    #[error("Failure while trying to read an executable document file from disk: {0}")]
    FileReadError(Box<file_reader::ReadContentError>),

    #[error(
        "An anonymous operation must be the only operation in its document \
        (found at {location})"
    )]
    MultipleAnonymousOperations {
        location: loc::SourceLocation,
    },

    #[error("Error parsing executable document {file:?}: {err}")]
    ParseError {
        file: Option<PathBuf>,
        err: String,
    },
}
