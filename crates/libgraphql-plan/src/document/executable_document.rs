use crate::document::FragmentDefinitionNode;
use crate::document::OperationDefinitionNode;
use crate::document::SyntaxArena;
use crate::document::SyntaxView;
use std::path::Path;
use thiserror::Error;

/// A parsed executable document, lowered into a [`SyntaxArena`].
///
/// Build one with an
/// [`ExecutableDocumentBuilder`](crate::document::ExecutableDocumentBuilder).
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutableDocument {
    pub(crate) fragments: Vec<FragmentDefinitionNode>,
    pub(crate) operations: Vec<OperationDefinitionNode>,
    pub(crate) syntax: SyntaxArena,
}
impl ExecutableDocument {
    pub fn file_path(&self) -> Option<&Path> {
        self.syntax.file_path()
    }

    /// Fragment definitions in document order.
    pub fn fragments(&self) -> &[FragmentDefinitionNode] {
        &self.fragments
    }

    /// Select the operation to compile.
    ///
    /// With a name, finds the operation with that name. Without one, the
    /// document must contain exactly one operation.
    pub fn operation(
        &self,
        operation_name: Option<&str>,
    ) -> Result<&OperationDefinitionNode, OperationLookupError> {
        self.operation_index(operation_name)
            .map(|idx| &self.operations[idx])
    }

    pub(crate) fn operation_index(
        &self,
        operation_name: Option<&str>,
    ) -> Result<usize, OperationLookupError> {
        match operation_name {
            Some(name) => self.operations.iter()
                .position(|op| op.name() == Some(name))
                .ok_or_else(|| OperationLookupError::OperationNotFound {
                    operation_name: Some(name.to_string()),
                }),

            None => match self.operations.len() {
                0 => Err(OperationLookupError::OperationNotFound {
                    operation_name: None,
                }),
                1 => Ok(0),
                operation_count => Err(OperationLookupError::AmbiguousOperation {
                    operation_count,
                }),
            },
        }
    }

    /// Operation definitions in document order.
    pub fn operations(&self) -> &[OperationDefinitionNode] {
        &self.operations
    }

    pub fn syntax(&self) -> &SyntaxArena {
        &self.syntax
    }

    pub fn syntax_view(&self) -> SyntaxView<'_> {
        SyntaxView::new(&self.syntax, None)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum OperationLookupError {
    #[error(
        "No operation name was given, but the document contains \
        {operation_count} operations"
    )]
    AmbiguousOperation {
        operation_count: usize,
    },

    #[error("{}", match operation_name {
        Some(name) => format!("No operation named `{name}` exists in the document"),
        None => "The document does not contain any operations".to_string(),
    })]
    OperationNotFound {
        operation_name: Option<String>,
    },
}
