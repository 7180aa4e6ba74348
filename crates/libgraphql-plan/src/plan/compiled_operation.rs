use crate::document::ExecutableDocument;
use crate::document::OperationDefinitionNode;
use crate::document::SelectionSetId;
use crate::document::SyntaxView;
use crate::plan::plan_printer;
use crate::plan::CompiledSelections;
use crate::plan::FragmentIndex;
use crate::plan::OperationCompileError;
use crate::plan::OperationCompiler;
use crate::plan::OptimizerPipeline;
use crate::plan::SelectionLookupError;
use crate::plan::SelectionSet;
use crate::plan::SelectionVariants;
use crate::schema::Schema;
use crate::types::ObjectType;
use std::sync::Arc;

/// The finished, immutable plan for one operation against one schema.
///
/// A `CompiledOperation` is built once per distinct (operation, schema) pair
/// and may be shared read-only across any number of concurrent executions.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledOperation<'schema> {
    compiled: CompiledSelections<'schema>,
    document: Arc<ExecutableDocument>,
    id: String,
}
impl<'schema> CompiledOperation<'schema> {
    /// Wrap the output of [`OperationCompiler::compile()`]. `compiled` must
    /// have been produced from `document`.
    pub fn new(
        id: impl Into<String>,
        document: Arc<ExecutableDocument>,
        compiled: CompiledSelections<'schema>,
    ) -> Self {
        Self {
            compiled,
            document,
            id: id.into(),
        }
    }

    /// Compile an operation of `document` and wrap the result.
    pub fn compile(
        id: impl Into<String>,
        schema: &'schema Schema,
        document: Arc<ExecutableDocument>,
        fragments: &FragmentIndex,
        operation_name: Option<&str>,
        optimizers: &OptimizerPipeline,
    ) -> Result<Self, OperationCompileError> {
        let compiled = OperationCompiler::compile(
            schema,
            &document,
            fragments,
            operation_name,
            optimizers,
        )?;
        Ok(Self::new(id, document, compiled))
    }

    pub fn document(&self) -> &ExecutableDocument {
        &self.document
    }

    /// A caller-chosen identifier (e.g. a hash of the document and schema).
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn operation(&self) -> &OperationDefinitionNode {
        self.compiled.operation()
    }

    /// Render the plan back into query-like syntax, for inspection and
    /// regression tests.
    pub fn print(&self) -> String {
        self.to_string()
    }

    pub fn root_selection_set(&self) -> Result<&SelectionSet<'schema>, SelectionLookupError> {
        self.selection_set(self.compiled.root_selection_set, self.compiled.root_type.name())
    }

    pub fn root_selection_variants(&self) -> Result<&SelectionVariants<'schema>, SelectionLookupError> {
        self.selection_variants(self.compiled.root_selection_set)
    }

    pub fn root_type(&self) -> &'schema ObjectType {
        self.compiled.root_type
    }

    /// Total number of [`Selection`](crate::plan::Selection)s in the plan,
    /// including those inside deferred fragments.
    pub fn selection_count(&self) -> usize {
        self.compiled.selection_count
    }

    /// The compiled selections of `node` for the concrete type `type_name`.
    pub fn selection_set(
        &self,
        node: SelectionSetId,
        type_name: &str,
    ) -> Result<&SelectionSet<'schema>, SelectionLookupError> {
        self.selection_variants(node)?.selection_set(type_name)
    }

    pub fn selection_variants(
        &self,
        node: SelectionSetId,
    ) -> Result<&SelectionVariants<'schema>, SelectionLookupError> {
        self.compiled.variants.get(&node).ok_or(SelectionLookupError::UnknownSelectionSet {
            selection_set: node,
        })
    }

    /// Every compiled node, in the order compilation first reached it.
    pub fn all_selection_variants(&self) -> impl Iterator<Item = &SelectionVariants<'schema>> {
        self.compiled.variants.values()
    }

    /// Resolves syntax ids found in the plan, including ids of syntax that
    /// optimizers injected.
    pub fn syntax(&self) -> SyntaxView<'_> {
        SyntaxView::new(self.document.syntax(), Some(&self.compiled.synthetic_syntax))
    }
}
impl std::fmt::Display for CompiledOperation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        plan_printer::write_operation(f, self)
    }
}
