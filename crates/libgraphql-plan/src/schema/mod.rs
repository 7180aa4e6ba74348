#[allow(clippy::module_inception)]
mod schema;
mod schema_builder;

pub use schema::Schema;
pub use schema_builder::NamedTypeDefLocation;
pub use schema_builder::SchemaBuildError;
pub use schema_builder::SchemaBuilder;
