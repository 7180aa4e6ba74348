use crate::document::OperationKind;
use crate::document::OperationLookupError;
use crate::document::SelectionSetId;
use crate::plan::Condition;
use crate::plan::ConditionClause;
use crate::plan::IncludeCondition;
use crate::plan::OperationCompileError;
use crate::plan::OptimizerPipeline;
use crate::plan::SelectionId;
use crate::plan::SelectionLookupError;
use crate::schema::SchemaBuilder;
use crate::test::compile;
use crate::test::star_wars_schema;
use crate::test::try_compile;
use std::collections::HashMap;

fn response_keys(selection_set: &crate::plan::SelectionSet<'_>) -> Vec<String> {
    selection_set.selections().iter()
        .map(|selection| selection.response_key().to_string())
        .collect()
}

#[test]
fn compiles_single_field() {
    let schema = SchemaBuilder::from_str(None, "type Query { foo: String }")
        .and_then(|builder| builder.build())
        .expect("schema builds");
    let operation = compile(&schema, "{ foo }");

    let root = operation.root_selection_set().expect("root set");
    assert_eq!(root.object_type().name(), "Query");
    assert_eq!(response_keys(root), vec!["foo"]);
    assert!(!root.is_conditional());
    assert!(root.deferred_fragments().is_empty());
}

#[test]
fn duplicate_fields_merge_into_one_selection() {
    let schema = SchemaBuilder::from_str(None, "type Query { foo: String }")
        .and_then(|builder| builder.build())
        .expect("schema builds");
    let operation = compile(&schema, "{ foo foo }");

    let root = operation.root_selection_set().expect("root set");
    assert_eq!(response_keys(root), vec!["foo"]);
    assert_eq!(root.selections()[0].syntax_nodes().len(), 2);
    assert_eq!(operation.selection_count(), 1);
}

#[test]
fn merged_duplicates_share_one_child_selection_set() {
    let schema = star_wars_schema();
    let operation = compile(&schema, "{ hero { name } hero { id name } }");

    let root = operation.root_selection_set().expect("root set");
    let hero = root.selection("hero").expect("hero selection");
    let child = hero.child_selection_set().expect("hero has children");

    let human = operation.selection_set(child, "Human").expect("Human variant");
    assert_eq!(response_keys(human), vec!["name", "id"]);
    assert_eq!(human.selection("name").expect("name").syntax_nodes().len(), 2);
}

#[test]
fn aliases_keep_selections_apart() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        "{ empire: hero(episode: EMPIRE) { name } jedi: hero(episode: JEDI) { id } }",
    );

    let root = operation.root_selection_set().expect("root set");
    assert_eq!(response_keys(root), vec!["empire", "jedi"]);
    assert_eq!(root.selections()[0].field_name(), "hero");
    assert_eq!(root.selections()[1].field_name(), "hero");

    let empire_child = root.selections()[0].child_selection_set().expect("children");
    let jedi_child = root.selections()[1].child_selection_set().expect("children");
    assert_ne!(empire_child, jedi_child);
    assert_eq!(
        response_keys(operation.selection_set(jedi_child, "Droid").expect("Droid variant")),
        vec!["id"],
    );
}

#[test]
fn abstract_field_compiles_one_variant_per_possible_type() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        "{ hero { name ... on Droid { primaryFunction } ... on Human { homePlanet } } }",
    );

    let hero = operation.root_selection_set().expect("root set")
        .selection("hero").expect("hero selection");
    let child = hero.child_selection_set().expect("hero has children");

    let variants = operation.selection_variants(child).expect("variants");
    let type_names = variants.possible_types().map(|t| t.name()).collect::<Vec<_>>();
    assert_eq!(type_names, vec!["Human", "Droid"]);

    let droid = variants.selection_set("Droid").expect("Droid variant");
    assert_eq!(response_keys(droid), vec!["name", "primaryFunction"]);
    assert_eq!(droid.object_type().name(), "Droid");

    let human = variants.selection_set("Human").expect("Human variant");
    assert_eq!(response_keys(human), vec!["name", "homePlanet"]);
}

#[test]
fn union_field_compiles_every_member() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        "{ search(text: \"r2\") { __typename ... on Starship { length } } }",
    );

    let search = operation.root_selection_set().expect("root set")
        .selection("search").expect("search selection");
    let child = search.child_selection_set().expect("search has children");

    let starship = operation.selection_set(child, "Starship").expect("Starship variant");
    assert_eq!(response_keys(starship), vec!["__typename", "length"]);
    let human = operation.selection_set(child, "Human").expect("Human variant");
    assert_eq!(response_keys(human), vec!["__typename"]);
}

#[test]
fn fragment_definitions_expand_per_type() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        concat!(
            "{ hero { ...HeroDetails } }\n",
            "fragment HeroDetails on Character {\n",
            "  name\n",
            "  ... on Droid { primaryFunction }\n",
            "  ...HumanDetails\n",
            "}\n",
            "fragment HumanDetails on Human { homePlanet name }\n",
        ),
    );

    let hero = operation.root_selection_set().expect("root set")
        .selection("hero").expect("hero selection");
    let child = hero.child_selection_set().expect("hero has children");

    assert_eq!(
        response_keys(operation.selection_set(child, "Droid").expect("Droid variant")),
        vec!["name", "primaryFunction"],
    );
    let human = operation.selection_set(child, "Human").expect("Human variant");
    assert_eq!(response_keys(human), vec!["name", "homePlanet"]);
    assert_eq!(human.selection("name").expect("name").syntax_nodes().len(), 2);
}

#[test]
fn unconditional_path_dominates_conditional_one() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        concat!(
            "query ($v: Boolean!) { hero { name @include(if: $v) ...Name } }\n",
            "fragment Name on Character { name }\n",
        ),
    );

    let hero = operation.root_selection_set().expect("root set")
        .selection("hero").expect("hero selection");
    let droid = operation
        .selection_set(hero.child_selection_set().expect("children"), "Droid")
        .expect("Droid variant");
    let name = droid.selection("name").expect("name selection");

    assert!(!name.is_conditional());
    assert_eq!(name.include_condition(), &IncludeCondition::Always);
    assert!(name.is_included(&HashMap::from([("v".to_string(), false)])));
}

#[test]
fn repeated_skip_directives_collapse_into_one_clause() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        "query ($a: Boolean!) { hero { name @skip(if: $a) name @skip(if: $a) } }",
    );

    let hero = operation.root_selection_set().expect("root set")
        .selection("hero").expect("hero selection");
    let human = operation
        .selection_set(hero.child_selection_set().expect("children"), "Human")
        .expect("Human variant");
    let name = human.selection("name").expect("name selection");

    let expected_clause = ConditionClause::always().and(Condition::skip_if("a"));
    assert_eq!(
        name.include_condition(),
        &IncludeCondition::Conditional(vec![expected_clause.expect("satisfiable")]),
    );
    assert!(human.is_conditional());
    assert!(name.is_included(&HashMap::from([("a".to_string(), false)])));
    assert!(!name.is_included(&HashMap::from([("a".to_string(), true)])));
}

#[test]
fn distinct_conditions_form_a_disjunction() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        "query ($a: Boolean!, $b: Boolean!) { hero { id @include(if: $a) id @skip(if: $b) } }",
    );

    let hero = operation.root_selection_set().expect("root set")
        .selection("hero").expect("hero selection");
    let droid = operation
        .selection_set(hero.child_selection_set().expect("children"), "Droid")
        .expect("Droid variant");
    let id = droid.selection("id").expect("id selection");

    assert_eq!(id.include_condition().clauses().len(), 2);
    let vars = |a, b| HashMap::from([("a".to_string(), a), ("b".to_string(), b)]);
    assert!(id.is_included(&vars(true, true)));
    assert!(id.is_included(&vars(false, false)));
    assert!(!id.is_included(&vars(false, true)));
}

#[test]
fn visibility_is_inherited_by_nested_selections() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        concat!(
            "query ($v: Boolean!, $w: Boolean!) {\n",
            "  hero @include(if: $v) { ... on Droid @skip(if: $w) { name } }\n",
            "}\n",
        ),
    );

    let root = operation.root_selection_set().expect("root set");
    let hero = root.selection("hero").expect("hero selection");
    assert!(hero.is_conditional());
    assert!(root.is_conditional());

    let child = hero.child_selection_set().expect("children");
    let droid = operation.selection_set(child, "Droid").expect("Droid variant");
    let name = droid.selection("name").expect("name selection");
    let clauses = name.include_condition().clauses()
        .iter()
        .map(|clause| clause.to_string())
        .collect::<Vec<_>>();
    assert_eq!(clauses, vec!["$v && !$w"]);

    let human = operation.selection_set(child, "Human").expect("Human variant");
    assert!(human.is_empty());
    assert!(!human.is_conditional());
}

#[test]
fn literal_skip_keeps_key_but_never_includes_it() {
    let schema = star_wars_schema();
    let operation = compile(&schema, "{ hero { name @skip(if: true) id @include(if: true) } }");

    let hero = operation.root_selection_set().expect("root set")
        .selection("hero").expect("hero selection");
    let human = operation
        .selection_set(hero.child_selection_set().expect("children"), "Human")
        .expect("Human variant");

    let name = human.selection("name").expect("name selection");
    assert!(name.include_condition().is_never());
    assert!(!name.is_included(&HashMap::<String, bool>::new()));

    let id = human.selection("id").expect("id selection");
    assert!(!id.is_conditional());

    let included = human.included_selections(&HashMap::<String, bool>::new())
        .map(|selection| selection.response_key())
        .collect::<Vec<_>>();
    assert_eq!(included, vec!["id"]);
}

#[test]
fn included_selections_outlive_the_variables() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        "query ($v: Boolean!) { hero { name @include(if: $v) id } }",
    );

    let hero = operation.root_selection_set().expect("root set")
        .selection("hero").expect("hero selection");
    let human = operation
        .selection_set(hero.child_selection_set().expect("children"), "Human")
        .expect("Human variant");

    let included = {
        let variables = HashMap::from([("v".to_string(), true)]);
        human.included_selections(&variables).collect::<Vec<_>>()
    };
    let keys = included.iter()
        .map(|selection| selection.response_key())
        .collect::<Vec<_>>();
    assert_eq!(keys, vec!["name", "id"]);
}

#[test]
fn selection_ids_are_dense_in_freeze_order() {
    let schema = star_wars_schema();
    let operation = compile(&schema, "{ hero { name } droid(id: 1) { id } }");

    let root = operation.root_selection_set().expect("root set");
    assert_eq!(root.selections()[0].id(), SelectionId(0));
    assert_eq!(root.selections()[1].id(), SelectionId(1));

    let hero_child = root.selections()[0].child_selection_set().expect("children");
    let human_name = operation.selection_set(hero_child, "Human").expect("Human variant")
        .selection("name").expect("name selection");
    let droid_name = operation.selection_set(hero_child, "Droid").expect("Droid variant")
        .selection("name").expect("name selection");
    assert_eq!(human_name.id(), SelectionId(2));
    assert_eq!(droid_name.id(), SelectionId(3));
    assert_eq!(operation.selection_count(), 5);
}

#[test]
fn shared_fragment_gets_distinct_child_keys_per_parent() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        concat!(
            "query ($v: Boolean!) {\n",
            "  human(id: 1) { ...Friends }\n",
            "  droid(id: 2) { ...Friends @include(if: $v) }\n",
            "}\n",
            "fragment Friends on Character { friends { name } }\n",
        ),
    );

    let root = operation.root_selection_set().expect("root set");
    let friends_of = |response_key: &str, type_name: &str| {
        let parent = root.selection(response_key).expect("parent selection");
        let child = parent.child_selection_set().expect("children");
        operation.selection_set(child, type_name).expect("variant")
            .selection("friends").expect("friends selection")
            .to_owned()
    };

    let human_friends = friends_of("human", "Human");
    let droid_friends = friends_of("droid", "Droid");
    assert_ne!(human_friends.child_selection_set(), droid_friends.child_selection_set());
    assert!(!human_friends.is_conditional());
    assert!(droid_friends.is_conditional());

    let droid_friends_child = droid_friends.child_selection_set().expect("children");
    let nested = operation.selection_set(droid_friends_child, "Human").expect("Human variant");
    assert!(nested.selection("name").expect("name selection").is_conditional());
    assert!(operation.syntax().selection_set(droid_friends_child).is_some());
}

#[test]
fn unknown_field_fails_compilation() {
    let schema = SchemaBuilder::from_str(None, "type Query { foo: String }")
        .and_then(|builder| builder.build())
        .expect("schema builds");
    let err = try_compile(&schema, "{ foo bar }", &OptimizerPipeline::new())
        .expect_err("bar is not a field of Query");

    assert!(matches!(
        &err,
        OperationCompileError::UnknownField { field_name, type_name, .. }
            if field_name == "bar" && type_name == "Query",
    ));
    assert_eq!(err.to_string(), "Field `bar` does not exist on type `Query`.");
}

#[test]
fn unknown_field_on_one_possible_type_fails_compilation() {
    let schema = star_wars_schema();
    let err = try_compile(
        &schema,
        "{ hero { ... on Droid { homePlanet } } }",
        &OptimizerPipeline::new(),
    ).expect_err("homePlanet is not a field of Droid");

    assert!(matches!(
        err,
        OperationCompileError::UnknownField { field_name, type_name, .. }
            if field_name == "homePlanet" && type_name == "Droid",
    ));
}

#[test]
fn undefined_fragment_fails_compilation() {
    let schema = star_wars_schema();
    let err = try_compile(&schema, "{ hero { ...Missing } }", &OptimizerPipeline::new())
        .expect_err("Missing is not defined");

    assert!(matches!(
        err,
        OperationCompileError::UndefinedFragment { fragment_name, .. }
            if fragment_name == "Missing",
    ));
}

#[test]
fn undefined_type_condition_fails_compilation() {
    let schema = star_wars_schema();
    let err = try_compile(&schema, "{ hero { ... on Wookiee { name } } }", &OptimizerPipeline::new())
        .expect_err("Wookiee is not defined");

    assert!(matches!(
        err,
        OperationCompileError::UndefinedType { type_name, .. } if type_name == "Wookiee",
    ));
}

#[test]
fn mutation_compiles_against_mutation_root() {
    let schema = star_wars_schema();
    let operation = compile(
        &schema,
        "mutation Review { createReview(episode: JEDI, stars: 5) { stars } }",
    );

    assert_eq!(operation.root_type().name(), "Mutation");
    assert_eq!(operation.operation().kind(), OperationKind::Mutation);
    assert_eq!(operation.operation().name(), Some("Review"));
}

#[test]
fn missing_root_operation_type_fails_compilation() {
    let schema = star_wars_schema();
    let err = try_compile(&schema, "subscription { hero { name } }", &OptimizerPipeline::new())
        .expect_err("no subscription root");

    assert_eq!(err, OperationCompileError::NoRootOperationType {
        operation_kind: OperationKind::Subscription,
    });
}

#[test]
fn operation_name_must_exist() {
    let schema = star_wars_schema();
    let document = crate::test::parse_document("query A { hero { name } }");
    let fragments = crate::plan::FragmentIndex::new(&document).expect("index builds");
    let err = crate::plan::CompiledOperation::compile(
        "test",
        &schema,
        document,
        &fragments,
        Some("B"),
        &OptimizerPipeline::new(),
    ).expect_err("B does not exist");

    assert_eq!(
        err,
        OperationCompileError::OperationLookup(OperationLookupError::OperationNotFound {
            operation_name: Some("B".to_string()),
        }),
    );
}

#[test]
fn looking_up_an_impossible_type_reports_variant_not_found() {
    let schema = star_wars_schema();
    let operation = compile(&schema, "{ hero { name } }");

    let hero = operation.root_selection_set().expect("root set")
        .selection("hero").expect("hero selection");
    let child = hero.child_selection_set().expect("children");

    assert_eq!(
        operation.selection_set(child, "Starship"),
        Err(SelectionLookupError::VariantNotFound {
            selection_set: child,
            type_name: "Starship".to_string(),
        }),
    );
    assert_eq!(
        operation.selection_set(SelectionSetId(999), "Human"),
        Err(SelectionLookupError::UnknownSelectionSet {
            selection_set: SelectionSetId(999),
        }),
    );
}

#[test]
fn compilation_is_idempotent() {
    let schema = star_wars_schema();
    let source = concat!(
        "query ($v: Boolean!) {\n",
        "  hero { name ...F @include(if: $v) ... @defer { id } }\n",
        "}\n",
        "fragment F on Character { friends { name } }\n",
    );

    assert_eq!(compile(&schema, source), compile(&schema, source));
}
