use crate::plan::OperationCompileError;
use crate::plan::OptimizerContext;
use crate::plan::OptimizerPipeline;
use crate::plan::SelectionOptimizer;
use crate::schema::Schema;
use crate::schema::SchemaBuilder;
use crate::test::star_wars_schema;
use crate::test::try_compile;
use std::sync::Arc;
use std::sync::Mutex;

/// Adds an internal selection of `source_text` under `response_key` to every
/// selection set compiled for `type_name`.
struct AddInternalField {
    response_key: &'static str,
    source_text: &'static str,
    type_name: &'static str,
}
impl SelectionOptimizer for AddInternalField {
    fn optimize_selection_set(
        &self,
        context: &mut OptimizerContext<'_, '_>,
    ) -> Result<(), OperationCompileError> {
        let applies = context.object_type().name() == self.type_name
            || context.object_type().implements(self.type_name);
        if !applies || context.fields().contains_key(self.response_key) {
            return Ok(());
        }

        let field_id = context.parse_field(self.source_text)?;
        let selection = context.internal_selection(field_id)?;
        context.fields_mut().insert(self.response_key.to_string(), selection);
        Ok(())
    }
}

struct RemoveField(&'static str);
impl SelectionOptimizer for RemoveField {
    fn optimize_selection_set(
        &self,
        context: &mut OptimizerContext<'_, '_>,
    ) -> Result<(), OperationCompileError> {
        context.fields_mut().shift_remove(self.0);
        Ok(())
    }
}

struct MisplaceField;
impl SelectionOptimizer for MisplaceField {
    fn optimize_selection_set(
        &self,
        context: &mut OptimizerContext<'_, '_>,
    ) -> Result<(), OperationCompileError> {
        let Some(selection) = context.fields().values().next().cloned() else {
            return Ok(());
        };
        context.fields_mut().insert("misplaced".to_string(), selection);
        Ok(())
    }
}

struct ParseFragment;
impl SelectionOptimizer for ParseFragment {
    fn optimize_selection_set(
        &self,
        context: &mut OptimizerContext<'_, '_>,
    ) -> Result<(), OperationCompileError> {
        context.parse_field("...Fragment").map(|_| ())
    }
}

/// Records `(path, type, keys)` for every selection set it sees.
#[derive(Clone, Default)]
struct RecordVisits(Arc<Mutex<Vec<(Vec<String>, String, Vec<String>)>>>);
impl RecordVisits {
    fn visits(&self) -> Vec<(Vec<String>, String, Vec<String>)> {
        self.0.lock().expect("lock not poisoned").clone()
    }
}
impl SelectionOptimizer for RecordVisits {
    fn optimize_selection_set(
        &self,
        context: &mut OptimizerContext<'_, '_>,
    ) -> Result<(), OperationCompileError> {
        let path = context.path().iter()
            .map(|segment| segment.response_key().to_string())
            .collect();
        let keys = context.fields().keys().cloned().collect();
        self.0.lock().expect("lock not poisoned").push((
            path,
            context.object_type().name().to_string(),
            keys,
        ));
        Ok(())
    }
}

fn bar_baz_schema() -> Schema {
    SchemaBuilder::from_str(
        None,
        concat!(
            "type Query { bar: Bar }\n",
            "type Bar { text: String baz: Baz }\n",
            "type Baz { text: String }\n",
        ),
    ).and_then(|builder| builder.build()).expect("schema builds")
}

#[test]
fn field_optimizer_adds_internal_selection_with_children() {
    let schema = bar_baz_schema();
    let optimizers = OptimizerPipeline::new().with_field_optimizer(
        "Query",
        "bar",
        AddInternalField {
            response_key: "baz",
            source_text: "baz { text }",
            type_name: "Bar",
        },
    );
    let operation = try_compile(&schema, "{ bar { text } }", &optimizers)
        .expect("operation compiles");

    let root = operation.root_selection_set().expect("root set");
    assert!(root.selection("baz").is_none());

    let bar_child = root.selection("bar").expect("bar selection")
        .child_selection_set().expect("children");
    let bar = operation.selection_set(bar_child, "Bar").expect("Bar variant");
    let keys = bar.selections().iter().map(|s| s.response_key()).collect::<Vec<_>>();
    assert_eq!(keys, vec!["text", "baz"]);

    let baz = bar.selection("baz").expect("baz selection");
    assert!(baz.is_internal());
    assert!(!baz.is_conditional());
    assert!(operation.syntax().field(baz.syntax_nodes()[0]).is_some());

    let baz_child = baz.child_selection_set().expect("baz has children");
    let baz_set = operation.selection_set(baz_child, "Baz").expect("Baz variant");
    assert_eq!(baz_set.selections().len(), 1);
    assert_eq!(baz_set.selections()[0].response_key(), "text");
    assert!(!baz_set.selections()[0].is_internal());
    assert_eq!(operation.selection_count(), 4);
}

#[test]
fn field_optimizer_matches_interface_declarations() {
    let schema = star_wars_schema();
    let optimizers = OptimizerPipeline::new().with_field_optimizer(
        "Character",
        "friends",
        AddInternalField {
            response_key: "id",
            source_text: "id",
            type_name: "Character",
        },
    );
    let operation = try_compile(&schema, "{ hero { name friends { name } } }", &optimizers)
        .expect("operation compiles");

    let hero_child = operation.root_selection_set().expect("root set")
        .selection("hero").expect("hero selection")
        .child_selection_set().expect("children");
    let human = operation.selection_set(hero_child, "Human").expect("Human variant");
    assert!(human.selection("id").is_none());

    let friends_child = human.selection("friends").expect("friends selection")
        .child_selection_set().expect("children");
    for type_name in ["Human", "Droid"] {
        let friend = operation.selection_set(friends_child, type_name).expect("variant");
        assert!(friend.selection("id").expect("injected id").is_internal());
    }
}

#[test]
fn operation_optimizer_can_remove_selections() {
    let schema = star_wars_schema();
    let operation = try_compile(
        &schema,
        "{ human(id: 1) { name mass } }",
        &OptimizerPipeline::new().with(RemoveField("mass")),
    ).expect("operation compiles");

    let human_child = operation.root_selection_set().expect("root set")
        .selection("human").expect("human selection")
        .child_selection_set().expect("children");
    let human = operation.selection_set(human_child, "Human").expect("Human variant");
    assert!(human.selection("mass").is_none());
    assert_eq!(operation.selection_count(), 2);
}

#[test]
fn optimizers_run_in_registration_order() {
    let schema = star_wars_schema();
    let recorder = RecordVisits::default();
    let optimizers = OptimizerPipeline::new()
        .with(AddInternalField {
            response_key: "__typename",
            source_text: "__typename",
            type_name: "Human",
        })
        .with(recorder.clone());
    try_compile(&schema, "{ human(id: 1) { name } }", &optimizers)
        .expect("operation compiles");

    assert_eq!(recorder.visits(), vec![
        (vec![], "Query".to_string(), vec!["human".to_string()]),
        (
            vec!["human".to_string()],
            "Human".to_string(),
            vec!["name".to_string(), "__typename".to_string()],
        ),
    ]);
}

#[test]
fn misplaced_selection_is_rejected() {
    let schema = star_wars_schema();
    let err = try_compile(
        &schema,
        "{ hero { name } }",
        &OptimizerPipeline::new().with(MisplaceField),
    ).expect_err("selection stored under the wrong key");

    assert_eq!(err, OperationCompileError::InvalidOptimizerRewrite {
        map_key: "misplaced".to_string(),
        response_key: "hero".to_string(),
        type_name: "Query".to_string(),
    });
}

#[test]
fn synthetic_syntax_must_be_a_single_field() {
    let schema = star_wars_schema();
    let err = try_compile(
        &schema,
        "{ hero { name } }",
        &OptimizerPipeline::new().with(ParseFragment),
    ).expect_err("a fragment spread is not a field");

    assert!(matches!(
        err,
        OperationCompileError::SyntheticSyntaxError { source_text, .. }
            if source_text == "...Fragment",
    ));
}

#[test]
fn pipeline_debug_lists_registrations() {
    let optimizers = OptimizerPipeline::new()
        .with(RemoveField("mass"))
        .with_field_optimizer("Query", "hero", RemoveField("name"));

    assert!(!optimizers.is_empty());
    assert!(OptimizerPipeline::new().is_empty());
    assert_eq!(
        format!("{optimizers:?}"),
        "OptimizerPipeline { field_optimizers: [\"Query.hero\"], optimizers: 1 }",
    );
}
