use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use libgraphql_plan::document::ExecutableDocument;
use libgraphql_plan::document::ExecutableDocumentBuilder;
use libgraphql_plan::plan::CompiledOperation;
use libgraphql_plan::plan::FragmentIndex;
use libgraphql_plan::plan::OptimizerPipeline;
use libgraphql_plan::schema::Schema;
use libgraphql_plan::schema::SchemaBuilder;
use std::sync::Arc;

const SCHEMA: &str = r#"
type Query {
  hero(episode: Episode): Character
  search(text: String): [SearchResult]
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
  starships: [Starship]
}
type Droid implements Character {
  id: ID!
  name: String!
  friends: [Character]
  appearsIn: [Episode]!
  primaryFunction: String
}
type Starship { id: ID! name: String! length: Float }
union SearchResult = Human | Droid | Starship
"#;

const FLAT_QUERY: &str = "{ hero { id name appearsIn } }";

const FRAGMENT_HEAVY_QUERY: &str = r#"
query Heavy($withFriends: Boolean!, $skipShips: Boolean!) {
  hero(episode: EMPIRE) {
    ...CharacterFields
    friends @include(if: $withFriends) {
      ...CharacterFields
      friends { ...CharacterFields friends { ...CharacterFields } }
    }
  }
  search(text: "a") {
    ... on Character { ...CharacterFields }
    ... on Starship { id name length }
  }
}

fragment CharacterFields on Character {
  id
  name
  appearsIn
  ... on Human { homePlanet starships @skip(if: $skipShips) { id name } }
  ... on Droid { primaryFunction }
  ...MoreCharacterFields @defer(label: "more")
}

fragment MoreCharacterFields on Character { name id }
"#;

fn document(source: &str) -> Arc<ExecutableDocument> {
    Arc::new(
        ExecutableDocumentBuilder::from_str(source, None)
            .and_then(|builder| builder.build())
            .expect("benchmark document builds"),
    )
}

fn schema() -> Schema {
    SchemaBuilder::from_str(None, SCHEMA)
        .and_then(|builder| builder.build())
        .expect("benchmark schema builds")
}

fn compile(c: &mut Criterion) {
    let schema = schema();
    let optimizers = OptimizerPipeline::new();
    let mut group = c.benchmark_group("compile");

    for (label, source) in [("flat", FLAT_QUERY), ("fragment_heavy", FRAGMENT_HEAVY_QUERY)] {
        let document = document(source);
        let fragments = FragmentIndex::new(&document).expect("fragment index builds");

        group.bench_with_input(BenchmarkId::new("compile_operation", label), &document, |b, document| {
            b.iter(|| {
                black_box(CompiledOperation::compile(
                    "bench",
                    &schema,
                    Arc::clone(document),
                    &fragments,
                    None,
                    &optimizers,
                ))
            })
        });
    }

    group.finish();
}

fn fragment_index(c: &mut Criterion) {
    let document = document(FRAGMENT_HEAVY_QUERY);

    c.bench_function("fragment_index", |b| {
        b.iter(|| black_box(FragmentIndex::new(&document)))
    });
}

criterion_group!(
    benches,
    compile,
    fragment_index,
);
criterion_main!(benches);
