//! Compiles a parsed GraphQL operation plus the [`Schema`](schema::Schema)
//! it targets into a [`CompiledOperation`](plan::CompiledOperation): a
//! reusable, per-concrete-type plan that an execution runtime can walk
//! field-by-field.
//!
//! ```
//! use libgraphql_plan::document::ExecutableDocumentBuilder;
//! use libgraphql_plan::plan::CompiledOperation;
//! use libgraphql_plan::plan::FragmentIndex;
//! use libgraphql_plan::plan::OptimizerPipeline;
//! use libgraphql_plan::schema::SchemaBuilder;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = SchemaBuilder::from_str(None, "type Query { foo: String }")?
//!     .build()?;
//! let document = Arc::new(
//!     ExecutableDocumentBuilder::from_str("{ foo foo }", None)
//!         .and_then(|builder| builder.build())
//!         .map_err(|errs| format!("{errs:?}"))?,
//! );
//! let fragments = FragmentIndex::new(&document)
//!     .map_err(|errs| format!("{errs:?}"))?;
//!
//! let operation = CompiledOperation::compile(
//!     "op",
//!     &schema,
//!     document,
//!     &fragments,
//!     None,
//!     &OptimizerPipeline::new(),
//! )?;
//! assert_eq!(operation.root_selection_set()?.selections().len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod document;
mod file_reader;
pub mod loc;
pub mod plan;
pub mod schema;
pub mod types;

pub use file_reader::ReadContentError;

#[cfg(test)]
mod test;
