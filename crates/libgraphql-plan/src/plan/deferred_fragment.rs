use crate::document::DirectiveNode;
use crate::document::FragmentSpreadId;
use crate::document::InlineFragmentId;
use crate::plan::IncludeCondition;
use crate::plan::SelectionSet;
use crate::plan::VariableValues;

/// The syntax a [`DeferredFragment`] came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeferredFragmentKind {
    FragmentSpread {
        fragment_name: String,
        id: FragmentSpreadId,
    },
    InlineFragment(InlineFragmentId),
}

/// A fragment marked `@defer`, kept apart from the selection set it
/// appeared in so its fields can be delivered incrementally.
#[derive(Clone, Debug, PartialEq)]
pub struct DeferredFragment<'schema> {
    pub(crate) if_variable: Option<String>,
    pub(crate) include_condition: IncludeCondition,
    pub(crate) kind: DeferredFragmentKind,
    pub(crate) label: Option<String>,
    pub(crate) selection_set: SelectionSet<'schema>,
    pub(crate) type_condition: Option<String>,
}
impl<'schema> DeferredFragment<'schema> {
    /// The variable named by `@defer(if: $var)`, if any.
    pub fn if_variable(&self) -> Option<&str> {
        self.if_variable.as_deref()
    }

    pub fn include_condition(&self) -> &IncludeCondition {
        &self.include_condition
    }

    /// Whether the fragment should be delivered incrementally for these
    /// variables. When this is `false` the runtime executes it inline.
    pub fn is_deferred(&self, variables: &(impl VariableValues + ?Sized)) -> bool {
        match &self.if_variable {
            Some(variable) => variables.boolean(variable).unwrap_or(false),
            None => true,
        }
    }

    pub fn is_included(&self, variables: &(impl VariableValues + ?Sized)) -> bool {
        self.include_condition.is_included(variables)
    }

    pub fn kind(&self) -> &DeferredFragmentKind {
        &self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The fragment's fields, compiled for the same concrete type as the
    /// selection set it was deferred from.
    pub fn selection_set(&self) -> &SelectionSet<'schema> {
        &self.selection_set
    }

    pub fn type_condition(&self) -> Option<&str> {
        self.type_condition.as_deref()
    }
}

/// The arguments of an applicable `@defer` directive.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DeferDirective {
    pub(crate) if_variable: Option<String>,
    pub(crate) label: Option<String>,
}
impl DeferDirective {
    /// `None` when there is no `@defer`, or it is `@defer(if: false)`.
    pub(crate) fn from_directives(directives: &[DirectiveNode]) -> Option<Self> {
        use crate::ast::operation::Value;

        let directive = directives.iter().find(|d| d.name() == "defer")?;
        let if_variable = match directive.argument("if") {
            Some(Value::Boolean(false)) => return None,
            Some(Value::Variable(variable)) => Some(variable.to_owned()),
            _ => None,
        };
        let label = match directive.argument("label") {
            Some(Value::String(label)) => Some(label.to_owned()),
            _ => None,
        };

        Some(Self {
            if_variable,
            label,
        })
    }
}
