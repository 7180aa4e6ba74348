mod executable_document;
mod executable_document_builder;
mod operation_kind;
mod syntax_arena;
mod syntax_ids;
mod syntax_nodes;

pub use executable_document::ExecutableDocument;
pub use executable_document::OperationLookupError;
pub use executable_document_builder::ExecutableDocumentBuildError;
pub use executable_document_builder::ExecutableDocumentBuilder;
pub use operation_kind::OperationKind;
pub use syntax_arena::SyntaxArena;
pub use syntax_arena::SyntaxView;
pub use syntax_ids::FieldId;
pub use syntax_ids::FragmentSpreadId;
pub use syntax_ids::InlineFragmentId;
pub use syntax_ids::SelectionSetId;
pub use syntax_nodes::DirectiveNode;
pub use syntax_nodes::FieldNode;
pub use syntax_nodes::FragmentDefinitionNode;
pub use syntax_nodes::FragmentSpreadNode;
pub use syntax_nodes::InlineFragmentNode;
pub use syntax_nodes::OperationDefinitionNode;
pub use syntax_nodes::SelectionNode;
pub use syntax_nodes::SelectionSetNode;
pub use syntax_nodes::VariableDefinitionNode;
