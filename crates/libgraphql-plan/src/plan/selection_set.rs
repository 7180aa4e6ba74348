use crate::plan::DeferredFragment;
use crate::plan::Selection;
use crate::plan::VariableValues;
use crate::types::ObjectType;

/// The [`Selection`]s that apply to one concrete object type at one
/// syntactic selection set, plus the fragments deferred at that point.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionSet<'schema> {
    pub(crate) deferred_fragments: Vec<DeferredFragment<'schema>>,
    pub(crate) is_conditional: bool,
    pub(crate) object_type: &'schema ObjectType,
    pub(crate) selections: Vec<Selection<'schema>>,
}
impl<'schema> SelectionSet<'schema> {
    pub fn deferred_fragments(&self) -> &[DeferredFragment<'schema>] {
        &self.deferred_fragments
    }

    /// The selections whose include condition holds for `variables`.
    pub fn included_selections<'s, 'v, V>(
        &'s self,
        variables: &'v V,
    ) -> impl Iterator<Item = &'s Selection<'schema>> + 'v
    where
        's: 'v,
        V: VariableValues + ?Sized,
    {
        self.selections.iter()
            .filter(move |selection| selection.is_included(variables))
    }

    /// `true` iff the set is non-empty and every selection in it is
    /// conditional.
    pub fn is_conditional(&self) -> bool {
        self.is_conditional
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty() && self.deferred_fragments.is_empty()
    }

    pub fn object_type(&self) -> &'schema ObjectType {
        self.object_type
    }

    pub fn selection(&self, response_key: &str) -> Option<&Selection<'schema>> {
        self.selections.iter()
            .find(|selection| selection.response_key() == response_key)
    }

    /// Selections in the order their response keys were first reached.
    pub fn selections(&self) -> &[Selection<'schema>] {
        &self.selections
    }
}
