use crate::ast;
use crate::document::FieldId;
use crate::document::FragmentDefinitionNode;
use crate::document::FragmentSpreadNode;
use crate::document::InlineFragmentNode;
use crate::document::SyntaxArena;
use crate::document::SyntaxView;
use crate::plan::IncludeCondition;
use crate::plan::OperationCompileError;
use crate::plan::Selection;
use crate::plan::SelectionId;
use crate::schema::Schema;
use crate::types::Field;
use crate::types::ObjectType;
use indexmap::IndexMap;

/// One step from the operation root to the selection set being compiled.
#[derive(Clone, Debug, PartialEq)]
pub struct PathSegment<'schema> {
    pub(crate) field: &'schema Field,
    pub(crate) response_key: String,
}
impl<'schema> PathSegment<'schema> {
    pub fn field(&self) -> &'schema Field {
        self.field
    }

    pub fn response_key(&self) -> &str {
        self.response_key.as_str()
    }
}

/// A plug-in that may veto `@defer` and rewrite each compiled selection set
/// before it is frozen.
///
/// Optimizers run in registration order and each one sees the map left by
/// the ones before it. An optimizer may add, replace, or remove entries of
/// the field map it is handed, but each entry must stay keyed by its
/// selection's response key.
pub trait SelectionOptimizer: Send + Sync {
    /// Whether the named fragment behind `spread` may be deferred. Returning
    /// `false` merges its fields into the enclosing selection set instead.
    fn allow_fragment_spread_deferral(
        &self,
        _context: &FragmentDeferralContext<'_, '_>,
        _spread: &FragmentSpreadNode,
        _definition: &FragmentDefinitionNode,
    ) -> bool {
        true
    }

    /// Whether `fragment` may be deferred. Returning `false` merges its
    /// fields into the enclosing selection set instead.
    fn allow_inline_fragment_deferral(
        &self,
        _context: &FragmentDeferralContext<'_, '_>,
        _fragment: &InlineFragmentNode,
    ) -> bool {
        true
    }

    fn optimize_selection_set(
        &self,
        context: &mut OptimizerContext<'_, '_>,
    ) -> Result<(), OperationCompileError>;
}

/// What an optimizer can see when deciding whether to allow a deferral.
#[derive(Clone, Copy, Debug)]
pub struct FragmentDeferralContext<'a, 'schema> {
    pub(crate) object_type: &'schema ObjectType,
    pub(crate) path: &'a [PathSegment<'schema>],
    pub(crate) schema: &'schema Schema,
}
impl<'a, 'schema> FragmentDeferralContext<'a, 'schema> {
    pub fn object_type(&self) -> &'schema ObjectType {
        self.object_type
    }

    pub fn path(&self) -> &'a [PathSegment<'schema>] {
        self.path
    }

    pub fn schema(&self) -> &'schema Schema {
        self.schema
    }
}

/// The selection set an optimizer is rewriting: one syntactic selection set
/// compiled for one concrete type.
pub struct OptimizerContext<'a, 'schema> {
    pub(crate) document_syntax: &'a SyntaxArena,
    pub(crate) fields: &'a mut IndexMap<String, Selection<'schema>>,
    pub(crate) object_type: &'schema ObjectType,
    pub(crate) path: &'a [PathSegment<'schema>],
    pub(crate) schema: &'schema Schema,
    pub(crate) synthetic_syntax: &'a mut SyntaxArena,
}
impl<'a, 'schema> OptimizerContext<'a, 'schema> {
    /// The merged selections, keyed by response key, in response order.
    pub fn fields(&self) -> &IndexMap<String, Selection<'schema>> {
        &*self.fields
    }

    pub fn fields_mut(&mut self) -> &mut IndexMap<String, Selection<'schema>> {
        &mut *self.fields
    }

    /// Build an internal [`Selection`] of `field_id` against the current
    /// object type. Its sub-selections are compiled like any other field's.
    pub fn internal_selection(
        &self,
        field_id: FieldId,
    ) -> Result<Selection<'schema>, OperationCompileError> {
        let field_node = self.syntax().field(field_id).ok_or_else(|| {
            OperationCompileError::SyntheticSyntaxError {
                source_text: field_id.to_string(),
                err: "no field node with this id exists".to_string(),
            }
        })?;

        let field = self.object_type.field(field_node.name()).ok_or_else(|| {
            OperationCompileError::UnknownField {
                field_name: field_node.name().to_string(),
                type_name: self.object_type.name().to_string(),
                location: field_node.location().to_owned(),
            }
        })?;

        Ok(Selection {
            arguments: field_node.arguments().to_vec(),
            child_selection_set: field_node.selection_set(),
            declaring_type: self.object_type,
            field,
            id: SelectionId::UNASSIGNED,
            include_condition: IncludeCondition::Always,
            internal: true,
            response_key: field_node.response_key().to_string(),
            syntax_nodes: vec![field_id],
        })
    }

    pub fn object_type(&self) -> &'schema ObjectType {
        self.object_type
    }

    /// Lower the source text of a single field (`baz { text }`,
    /// `a: b(x: 1)`) into synthetic syntax.
    pub fn parse_field(&mut self, source_text: &str) -> Result<FieldId, OperationCompileError> {
        let syntax_error = |err: String| OperationCompileError::SyntheticSyntaxError {
            source_text: source_text.to_string(),
            err,
        };

        let ast_doc = ast::operation::parse(&format!("{{ {source_text} }}"))
            .map_err(|err| syntax_error(err.to_string()))?;

        let field = match ast_doc.definitions.as_slice() {
            [ast::operation::Definition::Operation(
                ast::operation::OperationDefinition::SelectionSet(selection_set),
            )] => match selection_set.items.as_slice() {
                [ast::operation::Selection::Field(field)] => field,
                _ => return Err(syntax_error("expected exactly one field".to_string())),
            },
            _ => return Err(syntax_error("expected exactly one field".to_string())),
        };

        Ok(self.synthetic_syntax.lower_field(field))
    }

    pub fn path(&self) -> &'a [PathSegment<'schema>] {
        self.path
    }

    pub fn schema(&self) -> &'schema Schema {
        self.schema
    }

    pub fn syntax(&self) -> SyntaxView<'_> {
        SyntaxView::new(self.document_syntax, Some(&*self.synthetic_syntax))
    }
}

struct FieldOptimizer {
    field_name: String,
    optimizer: Box<dyn SelectionOptimizer>,
    type_name: String,
}

/// The ordered registry of [`SelectionOptimizer`]s applied during
/// compilation.
#[derive(Default)]
pub struct OptimizerPipeline {
    field_optimizers: Vec<FieldOptimizer>,
    optimizers: Vec<Box<dyn SelectionOptimizer>>,
}
impl OptimizerPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.optimizers.is_empty() && self.field_optimizers.is_empty()
    }

    /// Register an optimizer for every selection set in the operation.
    pub fn with(mut self, optimizer: impl SelectionOptimizer + 'static) -> Self {
        self.optimizers.push(Box::new(optimizer));
        self
    }

    /// Register an optimizer for the selection sets below any selection of
    /// `type_name.field_name`. `type_name` may name the object type or an
    /// interface it implements.
    pub fn with_field_optimizer(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        optimizer: impl SelectionOptimizer + 'static,
    ) -> Self {
        self.field_optimizers.push(FieldOptimizer {
            field_name: field_name.into(),
            optimizer: Box::new(optimizer),
            type_name: type_name.into(),
        });
        self
    }

    /// Optimizers registered for `field_name` on `declaring_type` (or an
    /// interface it implements), in registration order.
    pub(crate) fn field_optimizers(
        &self,
        declaring_type: &ObjectType,
        field_name: &str,
    ) -> Vec<&dyn SelectionOptimizer> {
        self.field_optimizers.iter()
            .filter(|entry| {
                entry.field_name == field_name
                    && (entry.type_name == declaring_type.name()
                        || declaring_type.implements(&entry.type_name))
            })
            .map(|entry| entry.optimizer.as_ref())
            .collect()
    }

    pub(crate) fn operation_optimizers(&self) -> impl Iterator<Item = &dyn SelectionOptimizer> {
        self.optimizers.iter().map(|optimizer| optimizer.as_ref())
    }
}
impl std::fmt::Debug for OptimizerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizerPipeline")
            .field("field_optimizers", &self.field_optimizers.iter()
                .map(|entry| format!("{}.{}", entry.type_name, entry.field_name))
                .collect::<Vec<_>>())
            .field("optimizers", &self.optimizers.len())
            .finish()
    }
}
