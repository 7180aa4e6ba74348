mod compiled_operation;
mod deferred_fragment;
mod fragment_index;
mod include_condition;
mod operation_compiler;
mod optimizer;
mod plan_printer;
mod selection;
mod selection_set;
mod selection_variants;

pub use compiled_operation::CompiledOperation;
pub use deferred_fragment::DeferredFragment;
pub use deferred_fragment::DeferredFragmentKind;
pub use fragment_index::FragmentIndex;
pub use fragment_index::FragmentIndexBuildError;
pub use fragment_index::FragmentIndexError;
pub use include_condition::Condition;
pub use include_condition::ConditionClause;
pub use include_condition::IncludeCondition;
pub use include_condition::VariableValues;
pub use operation_compiler::CompiledSelections;
pub use operation_compiler::OperationCompileError;
pub use operation_compiler::OperationCompiler;
pub use optimizer::FragmentDeferralContext;
pub use optimizer::OptimizerContext;
pub use optimizer::OptimizerPipeline;
pub use optimizer::PathSegment;
pub use optimizer::SelectionOptimizer;
pub use selection::Selection;
pub use selection::SelectionId;
pub use selection_set::SelectionSet;
pub use selection_variants::SelectionLookupError;
pub use selection_variants::SelectionVariants;

#[cfg(test)]
mod tests;
