use crate::document::SelectionSetId;
use crate::plan::SelectionSet;
use crate::types::ObjectType;
use indexmap::IndexMap;
use thiserror::Error;

/// All compiled [`SelectionSet`]s of one syntactic selection set, keyed by
/// the concrete object type each one applies to.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionVariants<'schema> {
    pub(crate) id: SelectionSetId,
    pub(crate) sets: IndexMap<String, SelectionSet<'schema>>,
}
impl<'schema> SelectionVariants<'schema> {
    pub(crate) fn new(id: SelectionSetId) -> Self {
        Self {
            id,
            sets: IndexMap::new(),
        }
    }

    pub fn id(&self) -> SelectionSetId {
        self.id
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SelectionSet<'schema>)> {
        self.sets.iter().map(|(type_name, set)| (type_name.as_str(), set))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Concrete types registered for this node, in discovery order.
    pub fn possible_types(&self) -> impl Iterator<Item = &'schema ObjectType> + '_ {
        self.sets.values().map(|set| set.object_type())
    }

    pub fn selection_set(
        &self,
        type_name: &str,
    ) -> Result<&SelectionSet<'schema>, SelectionLookupError> {
        self.sets.get(type_name).ok_or_else(|| SelectionLookupError::VariantNotFound {
            selection_set: self.id,
            type_name: type_name.to_string(),
        })
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SelectionLookupError {
    #[error("No selection set was compiled for syntax node {selection_set}")]
    UnknownSelectionSet {
        selection_set: SelectionSetId,
    },

    #[error(
        "Selection set {selection_set} was never compiled for type \
        `{type_name}`; that type is not a possible type at this position"
    )]
    VariantNotFound {
        selection_set: SelectionSetId,
        type_name: String,
    },
}
