use crate::document::FragmentDefinitionNode;
use crate::document::FragmentSpreadNode;
use crate::document::InlineFragmentNode;
use crate::plan::CompiledOperation;
use crate::plan::DeferredFragmentKind;
use crate::plan::FragmentDeferralContext;
use crate::plan::OperationCompileError;
use crate::plan::OptimizerContext;
use crate::plan::OptimizerPipeline;
use crate::plan::SelectionOptimizer;
use crate::plan::SelectionSet;
use crate::test::compile;
use crate::test::star_wars_schema;
use crate::test::try_compile;
use std::collections::HashMap;

struct NoDeferral;
impl SelectionOptimizer for NoDeferral {
    fn allow_fragment_spread_deferral(
        &self,
        _context: &FragmentDeferralContext<'_, '_>,
        _spread: &FragmentSpreadNode,
        _definition: &FragmentDefinitionNode,
    ) -> bool {
        false
    }

    fn allow_inline_fragment_deferral(
        &self,
        _context: &FragmentDeferralContext<'_, '_>,
        _fragment: &InlineFragmentNode,
    ) -> bool {
        false
    }

    fn optimize_selection_set(
        &self,
        _context: &mut OptimizerContext<'_, '_>,
    ) -> Result<(), OperationCompileError> {
        Ok(())
    }
}

/// Only allows deferral directly below the root `hero` field.
struct DeferOnlyUnderHero;
impl SelectionOptimizer for DeferOnlyUnderHero {
    fn allow_inline_fragment_deferral(
        &self,
        context: &FragmentDeferralContext<'_, '_>,
        _fragment: &InlineFragmentNode,
    ) -> bool {
        matches!(context.path(), [segment] if segment.response_key() == "hero")
    }

    fn optimize_selection_set(
        &self,
        _context: &mut OptimizerContext<'_, '_>,
    ) -> Result<(), OperationCompileError> {
        Ok(())
    }
}

fn hero_variant<'a, 'schema>(
    operation: &'a CompiledOperation<'schema>,
    type_name: &str,
) -> &'a SelectionSet<'schema> {
    let hero = operation.root_selection_set().expect("root set")
        .selection("hero").expect("hero selection");
    operation.selection_set(hero.child_selection_set().expect("children"), type_name)
        .expect("variant")
}

fn keys(selection_set: &SelectionSet<'_>) -> Vec<String> {
    selection_set.selections().iter()
        .map(|selection| selection.response_key().to_string())
        .collect()
}

#[test]
fn deferred_inline_fragment_is_carved_out() {
    let schema = star_wars_schema();
    let operation = compile(&schema, "{ hero { name ... @defer(label: \"slow\") { id friends { name } } } }");

    let droid = hero_variant(&operation, "Droid");
    assert_eq!(keys(droid), vec!["name"]);
    assert_eq!(droid.deferred_fragments().len(), 1);

    let deferred = &droid.deferred_fragments()[0];
    assert!(matches!(deferred.kind(), DeferredFragmentKind::InlineFragment(_)));
    assert_eq!(deferred.label(), Some("slow"));
    assert_eq!(deferred.type_condition(), None);
    assert!(deferred.is_deferred(&HashMap::<String, bool>::new()));
    assert!(!deferred.include_condition().is_conditional());
    assert_eq!(keys(deferred.selection_set()), vec!["id", "friends"]);
    assert_eq!(deferred.selection_set().object_type().name(), "Droid");

    let friends = deferred.selection_set().selection("friends").expect("friends selection");
    let friends_child = friends.child_selection_set().expect("children");
    let nested = operation.selection_set(friends_child, "Human").expect("Human variant");
    assert_eq!(keys(nested), vec!["name"]);
}

#[test]
fn deferred_fragment_spread_records_if_variable() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        concat!(
            "query ($d: Boolean!) { hero { id ...Details @defer(if: $d) } }\n",
            "fragment Details on Character { name appearsIn }\n",
        ),
    );

    let human = hero_variant(&operation, "Human");
    assert_eq!(keys(human), vec!["id"]);

    let deferred = &human.deferred_fragments()[0];
    assert!(matches!(
        deferred.kind(),
        DeferredFragmentKind::FragmentSpread { fragment_name, .. } if fragment_name == "Details",
    ));
    assert_eq!(deferred.type_condition(), Some("Character"));
    assert_eq!(deferred.if_variable(), Some("d"));
    assert!(deferred.is_deferred(&HashMap::from([("d".to_string(), true)])));
    assert!(!deferred.is_deferred(&HashMap::from([("d".to_string(), false)])));
    assert!(!deferred.is_deferred(&HashMap::<String, bool>::new()));
    assert_eq!(keys(deferred.selection_set()), vec!["name", "appearsIn"]);
}

#[test]
fn defer_if_false_merges_inline() {
    let schema = star_wars_schema();
    let operation = compile(&schema, "{ hero { name ... @defer(if: false) { id } } }");

    let human = hero_variant(&operation, "Human");
    assert_eq!(keys(human), vec!["name", "id"]);
    assert!(human.deferred_fragments().is_empty());
}

#[test]
fn deferred_fragment_carries_include_conditions() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        "query ($v: Boolean!) { hero { name ... on Droid @include(if: $v) @defer { primaryFunction } } }",
    );

    let droid = hero_variant(&operation, "Droid");
    let deferred = &droid.deferred_fragments()[0];
    assert_eq!(deferred.type_condition(), Some("Droid"));
    assert!(deferred.include_condition().is_conditional());
    assert!(deferred.is_included(&HashMap::from([("v".to_string(), true)])));
    assert!(!deferred.is_included(&HashMap::from([("v".to_string(), false)])));
    assert!(!deferred.selection_set().selection("primaryFunction").expect("field").is_conditional());

    let human = hero_variant(&operation, "Human");
    assert!(human.deferred_fragments().is_empty());
}

#[test]
fn vetoed_deferral_merges_fields() {
    let schema = star_wars_schema();
    let source = concat!(
        "{ hero { name ...Details @defer ... @defer { id } } }\n",
        "fragment Details on Character { appearsIn }\n",
    );
    let operation = try_compile(
        &schema,
        source,
        &OptimizerPipeline::new().with(NoDeferral),
    ).expect("operation compiles");

    let human = hero_variant(&operation, "Human");
    assert_eq!(keys(human), vec!["name", "appearsIn", "id"]);
    assert!(human.deferred_fragments().is_empty());
}

#[test]
fn veto_can_depend_on_path() {
    let schema = star_wars_schema();
    let operation = try_compile(
        &schema,
        "{ hero { ... @defer { id } friends { ... @defer { name } } } }",
        &OptimizerPipeline::new().with(DeferOnlyUnderHero),
    ).expect("operation compiles");

    let human = hero_variant(&operation, "Human");
    assert_eq!(keys(human), vec!["friends"]);
    assert_eq!(human.deferred_fragments().len(), 1);

    let friends_child = human.selection("friends").expect("friends selection")
        .child_selection_set().expect("children");
    let nested = operation.selection_set(friends_child, "Droid").expect("Droid variant");
    assert_eq!(keys(nested), vec!["name"]);
    assert!(nested.deferred_fragments().is_empty());
}
