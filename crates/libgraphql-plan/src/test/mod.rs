use crate::document::ExecutableDocument;
use crate::document::ExecutableDocumentBuilder;
use crate::plan::CompiledOperation;
use crate::plan::FragmentIndex;
use crate::plan::OperationCompileError;
use crate::plan::OptimizerPipeline;
use crate::schema::Schema;
use crate::schema::SchemaBuilder;
use std::sync::Arc;

pub(crate) const STAR_WARS_SCHEMA: &str = r#"
type Query {
  hero(episode: Episode): Character
  human(id: ID!): Human
  droid(id: ID!): Droid
  search(text: String): [SearchResult]
  character(id: ID!): Character
}

type Mutation {
  createReview(episode: Episode, stars: Int!): Review
}

enum Episode { NEWHOPE EMPIRE JEDI }

interface Character {
  id: ID!
  name: String!
  friends: [Character]
  appearsIn: [Episode]!
}

type Human implements Character {
  id: ID!
  name: String!
  friends: [Character]
  appearsIn: [Episode]!
  homePlanet: String
  height(unit: Unit = METER): Float
  mass: Float
  starships: [Starship]
}

type Droid implements Character {
  id: ID!
  name: String!
  friends: [Character]
  appearsIn: [Episode]!
  primaryFunction: String
  height: Float
}

enum Unit { METER FOOT }

type Starship {
  id: ID!
  name: String!
  length(unit: Unit = METER): Float
}

union SearchResult = Human | Droid | Starship

type Review {
  episode: Episode
  stars: Int!
  commentary: String
}
"#;

pub(crate) fn star_wars_schema() -> Schema {
    SchemaBuilder::from_str(None, STAR_WARS_SCHEMA)
        .and_then(|builder| builder.build())
        .expect("star wars schema builds")
}

pub(crate) fn parse_document(source: &str) -> Arc<ExecutableDocument> {
    let document = ExecutableDocumentBuilder::from_str(source, None)
        .and_then(|builder| builder.build())
        .expect("document builds");
    Arc::new(document)
}

pub(crate) fn try_compile<'schema>(
    schema: &'schema Schema,
    source: &str,
    optimizers: &OptimizerPipeline,
) -> Result<CompiledOperation<'schema>, OperationCompileError> {
    let document = parse_document(source);
    let fragments = FragmentIndex::new(&document).expect("fragment index builds");
    CompiledOperation::compile("test", schema, document, &fragments, None, optimizers)
}

pub(crate) fn compile<'schema>(schema: &'schema Schema, source: &str) -> CompiledOperation<'schema> {
    try_compile(schema, source, &OptimizerPipeline::new()).expect("operation compiles")
}
