use crate::ast;
use crate::document::FieldId;
use crate::document::SelectionSetId;
use crate::plan::IncludeCondition;
use crate::plan::VariableValues;
use crate::types::Field;
use crate::types::ObjectType;

/// Dense, operation-wide identifier of a compiled [`Selection`], assigned
/// when the selection set holding it is frozen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionId(pub(crate) u32);
impl SelectionId {
    /// Placeholder for selections that are still in an optimizer's field
    /// map.
    pub(crate) const UNASSIGNED: SelectionId = SelectionId(u32::MAX);

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// One field in a compiled plan.
///
/// All syntactic occurrences of the same response key within one (selection
/// set, concrete type) pair merge into a single `Selection`. The first
/// occurrence provides the arguments and the child selection set; every
/// occurrence contributes to the [`IncludeCondition`].
#[derive(Clone, Debug, PartialEq)]
pub struct Selection<'schema> {
    pub(crate) arguments: Vec<(String, ast::operation::Value)>,
    pub(crate) child_selection_set: Option<SelectionSetId>,
    pub(crate) declaring_type: &'schema ObjectType,
    pub(crate) field: &'schema Field,
    pub(crate) id: SelectionId,
    pub(crate) include_condition: IncludeCondition,
    pub(crate) internal: bool,
    pub(crate) response_key: String,
    pub(crate) syntax_nodes: Vec<FieldId>,
}
impl<'schema> Selection<'schema> {
    /// Argument syntax from the first occurrence, unresolved.
    pub fn arguments(&self) -> &[(String, ast::operation::Value)] {
        &self.arguments
    }

    /// Key of the [`SelectionVariants`](crate::plan::SelectionVariants) for
    /// this field's sub-selections, if the field has any.
    pub fn child_selection_set(&self) -> Option<SelectionSetId> {
        self.child_selection_set
    }

    /// The concrete type this selection was compiled for.
    pub fn declaring_type(&self) -> &'schema ObjectType {
        self.declaring_type
    }

    pub fn field(&self) -> &'schema Field {
        self.field
    }

    pub fn field_name(&self) -> &'schema str {
        self.field.name()
    }

    pub fn id(&self) -> SelectionId {
        self.id
    }

    pub fn include_condition(&self) -> &IncludeCondition {
        &self.include_condition
    }

    pub fn is_conditional(&self) -> bool {
        self.include_condition.is_conditional()
    }

    /// Whether this selection is part of the response for the given
    /// per-request variables.
    pub fn is_included(&self, variables: &(impl VariableValues + ?Sized)) -> bool {
        self.include_condition.is_included(variables)
    }

    /// Whether an optimizer synthesized this selection.
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    pub fn response_key(&self) -> &str {
        self.response_key.as_str()
    }

    /// Every field node merged into this selection, in document order.
    pub fn syntax_nodes(&self) -> &[FieldId] {
        &self.syntax_nodes
    }
}
