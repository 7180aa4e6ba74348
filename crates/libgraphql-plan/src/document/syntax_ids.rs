macro_rules! syntax_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Deserialize,
            serde::Serialize,
        )]
        pub struct $name(pub(crate) u32);
        impl $name {
            pub fn index(&self) -> usize {
                self.0 as usize
            }
        }
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

syntax_id!(
    /// Identifies a [`FieldNode`](crate::document::FieldNode).
    FieldId
);
syntax_id!(
    /// Identifies a [`FragmentSpreadNode`](crate::document::FragmentSpreadNode).
    FragmentSpreadId
);
syntax_id!(
    /// Identifies an [`InlineFragmentNode`](crate::document::InlineFragmentNode).
    InlineFragmentId
);
syntax_id!(
    /// Identifies a [`SelectionSetNode`](crate::document::SelectionSetNode).
    ///
    /// This is the key a [`CompiledOperation`](crate::plan::CompiledOperation)
    /// uses to find the per-type
    /// [`SelectionVariants`](crate::plan::SelectionVariants) of a field's
    /// child selection set.
    SelectionSetId
);
