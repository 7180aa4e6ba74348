use crate::ast;
use crate::document::ExecutableDocument;
use crate::document::FieldId;
use crate::document::OperationDefinitionNode;
use crate::document::OperationKind;
use crate::document::OperationLookupError;
use crate::document::SelectionNode;
use crate::document::SelectionSetId;
use crate::document::SelectionSetNode;
use crate::document::SyntaxArena;
use crate::document::SyntaxView;
use crate::loc;
use crate::plan::deferred_fragment::DeferDirective;
use crate::plan::ConditionClause;
use crate::plan::DeferredFragment;
use crate::plan::DeferredFragmentKind;
use crate::plan::FragmentDeferralContext;
use crate::plan::FragmentIndex;
use crate::plan::IncludeCondition;
use crate::plan::OptimizerContext;
use crate::plan::OptimizerPipeline;
use crate::plan::PathSegment;
use crate::plan::Selection;
use crate::plan::SelectionId;
use crate::plan::SelectionOptimizer;
use crate::plan::SelectionSet;
use crate::plan::SelectionVariants;
use crate::schema::Schema;
use crate::types::Field;
use crate::types::ObjectType;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::collections::HashSet;
use thiserror::Error;

type Result<T> = std::result::Result<T, OperationCompileError>;

/// The output of [`OperationCompiler::compile()`]: every compiled
/// [`SelectionVariants`], keyed by the syntactic selection set it belongs to.
///
/// Wrap it in a [`CompiledOperation`](crate::plan::CompiledOperation) (along
/// with the document it was compiled from) to hand it to a runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledSelections<'schema> {
    pub(crate) operation: OperationDefinitionNode,
    pub(crate) root_selection_set: SelectionSetId,
    pub(crate) root_type: &'schema ObjectType,
    pub(crate) selection_count: usize,
    pub(crate) synthetic_syntax: SyntaxArena,
    pub(crate) variants: IndexMap<SelectionSetId, SelectionVariants<'schema>>,
}
impl<'schema> CompiledSelections<'schema> {
    pub fn operation(&self) -> &OperationDefinitionNode {
        &self.operation
    }

    pub fn root_selection_set(&self) -> SelectionSetId {
        self.root_selection_set
    }

    pub fn root_type(&self) -> &'schema ObjectType {
        self.root_type
    }

    pub fn selection_count(&self) -> usize {
        self.selection_count
    }

    pub fn variants(&self) -> &IndexMap<SelectionSetId, SelectionVariants<'schema>> {
        &self.variants
    }
}

/// Every occurrence of one response key reached while collecting a selection
/// set, before it is frozen into a [`Selection`].
struct CollectedField<'schema> {
    arguments: Vec<(String, ast::operation::Value)>,
    child_selection_set: Option<SelectionSetId>,
    field: &'schema Field,
    include_condition: IncludeCondition,
    /// Occurrences that can be reached, with the clause of each path.
    live_occurrences: Vec<(FieldId, ConditionClause)>,
    syntax_nodes: Vec<FieldId>,
}

/// A fragment carved out of a selection set by `@defer`.
struct PendingDeferral {
    clause: ConditionClause,
    directive: DeferDirective,
    kind: DeferredFragmentKind,
    selection_set: SelectionSetId,
    type_condition: Option<String>,
}

/// Compiles one operation of an [`ExecutableDocument`] into per-type
/// selection sets.
///
/// Every selection set is compiled for each concrete type that can reach
/// it: a field of interface or union type has its sub-selections compiled
/// once per possible object type.
pub struct OperationCompiler<'a, 'schema> {
    claimed_selection_sets: HashSet<SelectionSetId>,
    document: &'a ExecutableDocument,
    fragments: &'a FragmentIndex,
    next_selection_id: u32,
    optimizers: &'a OptimizerPipeline,
    schema: &'schema Schema,
    synthetic_syntax: SyntaxArena,
    variants: IndexMap<SelectionSetId, SelectionVariants<'schema>>,
}
impl<'a, 'schema> OperationCompiler<'a, 'schema> {
    /// Compile the operation named `operation_name` (or the document's only
    /// operation when `None`).
    ///
    /// Any error aborts compilation; no partial plan is produced.
    pub fn compile(
        schema: &'schema Schema,
        document: &'a ExecutableDocument,
        fragments: &'a FragmentIndex,
        operation_name: Option<&str>,
        optimizers: &'a OptimizerPipeline,
    ) -> Result<CompiledSelections<'schema>> {
        let operation = document.operation(operation_name)?;
        let root_type = schema.root_operation_type(operation.kind())
            .ok_or(OperationCompileError::NoRootOperationType {
                operation_kind: operation.kind(),
            })?;

        log::debug!(
            "Compiling {} `{}` against root type `{}`.",
            operation.kind(),
            operation.name().unwrap_or("<anonymous>"),
            root_type.name(),
        );

        let mut compiler = Self {
            claimed_selection_sets: HashSet::new(),
            document,
            fragments,
            next_selection_id: 0,
            optimizers,
            schema,
            synthetic_syntax: SyntaxArena::synthetic_after(document.syntax()),
            variants: IndexMap::new(),
        };

        let root_selection_set = operation.selection_set();
        let root_optimizers = optimizers.operation_optimizers().collect::<Vec<_>>();
        compiler.claimed_selection_sets.insert(root_selection_set);
        compiler.compile_variant(
            root_selection_set,
            root_type,
            &[(root_selection_set, ConditionClause::always())],
            &mut vec![],
            &root_optimizers,
        )?;

        log::debug!(
            "Compiled `{}`: {} selection set node(s), {} selection(s).",
            operation.name().unwrap_or("<anonymous>"),
            compiler.variants.len(),
            compiler.next_selection_id,
        );

        Ok(CompiledSelections {
            operation: operation.to_owned(),
            root_selection_set,
            root_type,
            selection_count: compiler.next_selection_id as usize,
            synthetic_syntax: compiler.synthetic_syntax,
            variants: compiler.variants,
        })
    }

    /// Compile the union of `sources` for `object_type` and store the result
    /// under `key`.
    fn compile_variant(
        &mut self,
        key: SelectionSetId,
        object_type: &'schema ObjectType,
        sources: &[(SelectionSetId, ConditionClause)],
        path: &mut Vec<PathSegment<'schema>>,
        optimizers: &[&'a dyn SelectionOptimizer],
    ) -> Result<()> {
        self.variants.entry(key).or_insert_with(|| SelectionVariants::new(key));

        let selection_set = self.build_selection_set(object_type, sources, path, optimizers)?;

        log::trace!(
            "Compiled {key} for `{}`: {} selection(s), {} deferred fragment(s).",
            object_type.name(),
            selection_set.selections.len(),
            selection_set.deferred_fragments.len(),
        );

        if let Some(variants) = self.variants.get_mut(&key) {
            variants.sets.insert(object_type.name().to_string(), selection_set);
        }
        Ok(())
    }

    fn build_selection_set(
        &mut self,
        object_type: &'schema ObjectType,
        sources: &[(SelectionSetId, ConditionClause)],
        path: &mut Vec<PathSegment<'schema>>,
        optimizers: &[&'a dyn SelectionOptimizer],
    ) -> Result<SelectionSet<'schema>> {
        let mut collected = IndexMap::<String, CollectedField<'schema>>::new();
        let mut deferrals = vec![];
        for (selection_set, clause) in sources {
            self.collect_fields(
                object_type,
                *selection_set,
                Some(clause),
                path,
                optimizers,
                &mut collected,
                &mut deferrals,
            )?;
        }

        let mut deferred_fragments = Vec::with_capacity(deferrals.len());
        for deferral in deferrals {
            let selection_set = self.build_selection_set(
                object_type,
                &[(deferral.selection_set, ConditionClause::always())],
                path,
                optimizers,
            )?;
            deferred_fragments.push(DeferredFragment {
                if_variable: deferral.directive.if_variable,
                include_condition: IncludeCondition::from_clause(deferral.clause),
                kind: deferral.kind,
                label: deferral.directive.label,
                selection_set,
                type_condition: deferral.type_condition,
            });
        }

        let mut live_occurrences = HashMap::<FieldId, Vec<(FieldId, ConditionClause)>>::new();
        let mut fields = IndexMap::<String, Selection<'schema>>::with_capacity(collected.len());
        for (response_key, collected_field) in collected {
            if let Some(first_node) = collected_field.syntax_nodes.first() {
                live_occurrences.insert(*first_node, collected_field.live_occurrences);
            }
            fields.insert(response_key.to_owned(), Selection {
                arguments: collected_field.arguments,
                child_selection_set: collected_field.child_selection_set,
                declaring_type: object_type,
                field: collected_field.field,
                id: SelectionId::UNASSIGNED,
                include_condition: collected_field.include_condition,
                internal: false,
                response_key,
                syntax_nodes: collected_field.syntax_nodes,
            });
        }

        self.run_optimizers(object_type, &mut fields, path, optimizers)?;

        // Freeze: claim child keys and hand out ids before descending.
        let mut child_jobs = vec![];
        for selection in fields.values_mut() {
            selection.id = SelectionId(self.next_selection_id);
            self.next_selection_id += 1;

            let Some(child_key) = selection.child_selection_set else {
                continue;
            };
            let child_key = self.claim_selection_set(child_key);
            selection.child_selection_set = Some(child_key);

            let occurrences = selection.syntax_nodes.first()
                .and_then(|first_node| live_occurrences.remove(first_node))
                .unwrap_or_else(|| {
                    selection.syntax_nodes.iter()
                        .map(|field_id| (*field_id, ConditionClause::always()))
                        .collect()
                });
            child_jobs.push((
                child_key,
                selection.declaring_type,
                selection.field,
                selection.response_key.to_owned(),
                occurrences,
            ));
        }

        for (child_key, declaring_type, field, response_key, occurrences) in child_jobs {
            self.compile_children(
                child_key,
                declaring_type,
                field,
                response_key,
                occurrences,
                path,
                optimizers,
            )?;
        }

        let selections = fields.into_values().collect::<Vec<_>>();
        let is_conditional =
            !selections.is_empty()
                && selections.iter().all(|selection| selection.is_conditional());

        Ok(SelectionSet {
            deferred_fragments,
            is_conditional,
            object_type,
            selections,
        })
    }

    /// Return `key` if no other selection uses it as its child key yet,
    /// otherwise a fresh key for a copy of the same syntax.
    ///
    /// The same syntactic selection set can sit below several compiled
    /// selections (one per concrete parent type, or per spread of a shared
    /// fragment), and each of those merges its own set of occurrences.
    fn claim_selection_set(&mut self, key: SelectionSetId) -> SelectionSetId {
        if self.claimed_selection_sets.insert(key) {
            return key;
        }

        let source = self.syntax().selection_set(key).cloned()
            .unwrap_or_else(|| SelectionSetNode {
                id: key,
                location: loc::SourceLocation::Synthetic,
                selections: vec![],
            });
        let fresh_key = self.synthetic_syntax.copy_selection_set(&source);
        self.claimed_selection_sets.insert(fresh_key);
        fresh_key
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_fields(
        &self,
        object_type: &'schema ObjectType,
        selection_set: SelectionSetId,
        clause: Option<&ConditionClause>,
        path: &[PathSegment<'schema>],
        optimizers: &[&'a dyn SelectionOptimizer],
        collected: &mut IndexMap<String, CollectedField<'schema>>,
        deferrals: &mut Vec<PendingDeferral>,
    ) -> Result<()> {
        let syntax = self.syntax();
        let Some(selection_set) = syntax.selection_set(selection_set) else {
            return Ok(());
        };

        for selection in selection_set.selections() {
            match *selection {
                SelectionNode::Field(field_id) => {
                    let Some(field_node) = syntax.field(field_id) else {
                        continue;
                    };
                    let field = object_type.field(field_node.name()).ok_or_else(|| {
                        OperationCompileError::UnknownField {
                            field_name: field_node.name().to_string(),
                            type_name: object_type.name().to_string(),
                            location: field_node.location().to_owned(),
                        }
                    })?;

                    let occurrence =
                        clause.and_then(|clause| clause.and_directives(field_node.directives()));
                    let collected_field = collected
                        .entry(field_node.response_key().to_string())
                        .or_insert_with(|| CollectedField {
                            arguments: field_node.arguments().to_vec(),
                            child_selection_set: field_node.selection_set(),
                            field,
                            include_condition: IncludeCondition::never(),
                            live_occurrences: vec![],
                            syntax_nodes: vec![],
                        });
                    collected_field.syntax_nodes.push(field_id);
                    if let Some(occurrence) = occurrence {
                        collected_field.include_condition.add_clause(occurrence.to_owned());
                        collected_field.live_occurrences.push((field_id, occurrence));
                    }
                },

                SelectionNode::InlineFragment(inline_id) => {
                    let Some(fragment) = syntax.inline_fragment(inline_id) else {
                        continue;
                    };
                    if let Some(type_condition) = fragment.type_condition()
                        && !self.type_condition_applies(type_condition, object_type, fragment.location())? {
                        continue;
                    }

                    let occurrence =
                        clause.and_then(|clause| clause.and_directives(fragment.directives()));
                    if let Some(occurrence) = &occurrence
                        && let Some(directive) = DeferDirective::from_directives(fragment.directives()) {
                        let context = FragmentDeferralContext {
                            object_type,
                            path,
                            schema: self.schema,
                        };
                        let allowed = optimizers.iter().all(|optimizer| {
                            optimizer.allow_inline_fragment_deferral(&context, fragment)
                        });
                        log::trace!(
                            "@defer on inline fragment {inline_id} for `{}`: {}.",
                            object_type.name(),
                            if allowed { "deferred" } else { "vetoed" },
                        );
                        if allowed {
                            deferrals.push(PendingDeferral {
                                clause: occurrence.to_owned(),
                                directive,
                                kind: DeferredFragmentKind::InlineFragment(inline_id),
                                selection_set: fragment.selection_set(),
                                type_condition: fragment.type_condition().map(str::to_string),
                            });
                            continue;
                        }
                    }

                    self.collect_fields(
                        object_type,
                        fragment.selection_set(),
                        occurrence.as_ref(),
                        path,
                        optimizers,
                        collected,
                        deferrals,
                    )?;
                },

                SelectionNode::FragmentSpread(spread_id) => {
                    let Some(spread) = syntax.fragment_spread(spread_id) else {
                        continue;
                    };
                    let definition = self.fragments.resolve(spread.fragment_name())
                        .map_err(|_| OperationCompileError::UndefinedFragment {
                            fragment_name: spread.fragment_name().to_string(),
                            location: spread.location().to_owned(),
                        })?;
                    if !self.type_condition_applies(
                        definition.type_condition(),
                        object_type,
                        definition.location(),
                    )? {
                        continue;
                    }

                    let occurrence =
                        clause.and_then(|clause| clause.and_directives(spread.directives()));
                    if let Some(occurrence) = &occurrence
                        && let Some(directive) = DeferDirective::from_directives(spread.directives()) {
                        let context = FragmentDeferralContext {
                            object_type,
                            path,
                            schema: self.schema,
                        };
                        let allowed = optimizers.iter().all(|optimizer| {
                            optimizer.allow_fragment_spread_deferral(&context, spread, definition)
                        });
                        log::trace!(
                            "@defer on spread of `{}` for `{}`: {}.",
                            spread.fragment_name(),
                            object_type.name(),
                            if allowed { "deferred" } else { "vetoed" },
                        );
                        if allowed {
                            deferrals.push(PendingDeferral {
                                clause: occurrence.to_owned(),
                                directive,
                                kind: DeferredFragmentKind::FragmentSpread {
                                    fragment_name: spread.fragment_name().to_string(),
                                    id: spread_id,
                                },
                                selection_set: definition.selection_set(),
                                type_condition: Some(definition.type_condition().to_string()),
                            });
                            continue;
                        }
                    }

                    self.collect_fields(
                        object_type,
                        definition.selection_set(),
                        occurrence.as_ref(),
                        path,
                        optimizers,
                        collected,
                        deferrals,
                    )?;
                },
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn compile_children(
        &mut self,
        child_key: SelectionSetId,
        declaring_type: &'schema ObjectType,
        field: &'schema Field,
        response_key: String,
        occurrences: Vec<(FieldId, ConditionClause)>,
        path: &mut Vec<PathSegment<'schema>>,
        optimizers: &[&'a dyn SelectionOptimizer],
    ) -> Result<()> {
        let syntax = self.syntax();
        let sources = occurrences.into_iter()
            .filter_map(|(field_id, clause)| {
                syntax.field(field_id)
                    .and_then(|field_node| field_node.selection_set())
                    .map(|selection_set| (selection_set, clause))
            })
            .collect::<Vec<_>>();

        let pipeline = self.optimizers;
        let mut child_optimizers = optimizers.to_vec();
        child_optimizers.extend(pipeline.field_optimizers(declaring_type, field.name()));

        self.variants.entry(child_key).or_insert_with(|| SelectionVariants::new(child_key));
        path.push(PathSegment {
            field,
            response_key,
        });
        let schema = self.schema;
        for possible_type in schema.possible_types(field.type_annotation().innermost_type_name()) {
            self.compile_variant(child_key, possible_type, &sources, path, &child_optimizers)?;
        }
        path.pop();

        Ok(())
    }

    fn run_optimizers(
        &mut self,
        object_type: &'schema ObjectType,
        fields: &mut IndexMap<String, Selection<'schema>>,
        path: &[PathSegment<'schema>],
        optimizers: &[&'a dyn SelectionOptimizer],
    ) -> Result<()> {
        if optimizers.is_empty() {
            return Ok(());
        }

        let document = self.document;
        for optimizer in optimizers {
            let mut context = OptimizerContext {
                document_syntax: document.syntax(),
                fields: &mut *fields,
                object_type,
                path,
                schema: self.schema,
                synthetic_syntax: &mut self.synthetic_syntax,
            };
            optimizer.optimize_selection_set(&mut context)?;
        }

        for (map_key, selection) in fields.iter() {
            if map_key != selection.response_key() {
                return Err(OperationCompileError::InvalidOptimizerRewrite {
                    map_key: map_key.to_owned(),
                    response_key: selection.response_key().to_string(),
                    type_name: object_type.name().to_string(),
                });
            }
        }

        Ok(())
    }

    fn syntax(&self) -> SyntaxView<'_> {
        SyntaxView::new(self.document.syntax(), Some(&self.synthetic_syntax))
    }

    fn type_condition_applies(
        &self,
        type_condition: &str,
        object_type: &ObjectType,
        location: &loc::SourceLocation,
    ) -> Result<bool> {
        if self.schema.lookup_type(type_condition).is_none() {
            return Err(OperationCompileError::UndefinedType {
                type_name: type_condition.to_string(),
                location: location.to_owned(),
            });
        }
        Ok(self.schema.is_possible_type(type_condition, object_type.name()))
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum OperationCompileError {
    #[error(
        "An optimizer stored the selection `{response_key}` under the key \
        `{map_key}` while compiling a selection set for `{type_name}`"
    )]
    InvalidOptimizerRewrite {
        map_key: String,
        response_key: String,
        type_name: String,
    },

    #[error("The schema does not define a {operation_kind} root operation type")]
    NoRootOperationType {
        operation_kind: OperationKind,
    },

    #[error(transparent)]
    OperationLookup(#[from] OperationLookupError),

    #[error("Failed to lower synthetic syntax `{source_text}`: {err}")]
    SyntheticSyntaxError {
        source_text: String,
        err: String,
    },

    #[error("Fragment `{fragment_name}` is not defined (spread at {location})")]
    UndefinedFragment {
        fragment_name: String,
        location: loc::SourceLocation,
    },

    #[error("Type condition at {location} names the undefined type `{type_name}`")]
    UndefinedType {
        type_name: String,
        location: loc::SourceLocation,
    },

    #[error("Field `{field_name}` does not exist on type `{type_name}`.")]
    UnknownField {
        field_name: String,
        type_name: String,
        location: loc::SourceLocation,
    },
}
