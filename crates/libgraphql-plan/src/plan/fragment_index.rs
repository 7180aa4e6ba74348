use crate::document::ExecutableDocument;
use crate::document::FragmentDefinitionNode;
use crate::document::SelectionNode;
use crate::document::SelectionSetId;
use crate::document::SyntaxView;
use crate::loc;
use indexmap::IndexMap;
use std::collections::HashSet;
use thiserror::Error;

type Result<T> = std::result::Result<T, Vec<FragmentIndexBuildError>>;

/// Index of the named fragment definitions in one [`ExecutableDocument`].
///
/// Built once per document and immutable afterwards, so a single index can
/// be shared by every compilation of that document's operations.
/// Definitions refer to syntax by id, so an index must only be used with the
/// document it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentIndex {
    fragments: IndexMap<String, FragmentDefinitionNode>,
}
impl FragmentIndex {
    /// Index every fragment definition in `document`.
    ///
    /// Fails if two definitions share a name or if fragment spreads form a
    /// cycle. All problems found are reported together.
    pub fn new(document: &ExecutableDocument) -> Result<Self> {
        let mut errors = vec![];
        let mut fragments = IndexMap::<String, FragmentDefinitionNode>::new();

        for fragment in document.fragments() {
            if let Some(existing) = fragments.get(fragment.name()) {
                errors.push(FragmentIndexBuildError::DuplicateFragmentDefinition {
                    fragment_name: fragment.name().to_string(),
                    first_def_location: existing.location().to_owned(),
                    second_def_location: fragment.location().to_owned(),
                });
                continue;
            }
            fragments.insert(fragment.name().to_string(), fragment.to_owned());
        }

        let index = Self { fragments };
        errors.extend(index.validate_no_cycles(document.syntax_view()));

        if !errors.is_empty() {
            return Err(errors);
        }

        log::trace!("Indexed {} fragment definition(s).", index.len());
        Ok(index)
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Fragment names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(|name| name.as_str())
    }

    pub fn resolve(
        &self,
        fragment_name: &str,
    ) -> std::result::Result<&FragmentDefinitionNode, FragmentIndexError> {
        self.fragments.get(fragment_name).ok_or_else(|| {
            FragmentIndexError::UndefinedFragment {
                fragment_name: fragment_name.to_string(),
            }
        })
    }

    fn validate_no_cycles(&self, syntax: SyntaxView<'_>) -> Vec<FragmentIndexBuildError> {
        let mut search = CycleSearch {
            errors: vec![],
            finished: HashSet::new(),
            fragments: &self.fragments,
            path: vec![],
            seen_normalized: HashSet::new(),
            syntax,
        };
        for fragment_name in self.fragments.keys() {
            search.visit_fragment(fragment_name);
        }
        search.errors
    }
}

/// Depth-first walk over fragment spreads. `path` holds the fragments
/// currently being explored; `finished` holds fragments whose spreads have
/// all been explored, so each fragment body is walked at most once.
struct CycleSearch<'a> {
    errors: Vec<FragmentIndexBuildError>,
    finished: HashSet<&'a str>,
    fragments: &'a IndexMap<String, FragmentDefinitionNode>,
    path: Vec<&'a str>,
    seen_normalized: HashSet<Vec<String>>,
    syntax: SyntaxView<'a>,
}
impl<'a> CycleSearch<'a> {
    fn visit_fragment(&mut self, fragment_name: &str) {
        if let Some(start) = self.path.iter().position(|name| *name == fragment_name) {
            // Report the cycle itself, not the path that led into it.
            let mut cycle_path = self.path[start..].iter()
                .map(|name| name.to_string())
                .collect::<Vec<_>>();
            cycle_path.push(fragment_name.to_string());

            if self.seen_normalized.insert(normalize_cycle(&cycle_path)) {
                self.errors.push(FragmentIndexBuildError::FragmentCycleDetected {
                    cycle_path,
                });
            }
            return;
        }

        // Undefined fragments surface when compiling the spread.
        let Some((name, fragment)) = self.fragments.get_key_value(fragment_name) else {
            return;
        };
        let name = name.as_str();
        if self.finished.contains(name) {
            return;
        }

        self.path.push(name);
        self.visit_selection_set(fragment.selection_set());
        self.path.pop();
        self.finished.insert(name);
    }

    fn visit_selection_set(&mut self, selection_set: SelectionSetId) {
        let syntax = self.syntax;
        let Some(selection_set) = syntax.selection_set(selection_set) else {
            return;
        };

        for selection in selection_set.selections() {
            match selection {
                SelectionNode::Field(field_id) => {
                    let nested_set = syntax.field(*field_id)
                        .and_then(|field| field.selection_set());
                    if let Some(nested_set) = nested_set {
                        self.visit_selection_set(nested_set);
                    }
                },

                SelectionNode::FragmentSpread(spread_id) => {
                    if let Some(spread) = syntax.fragment_spread(*spread_id) {
                        self.visit_fragment(spread.fragment_name());
                    }
                },

                SelectionNode::InlineFragment(inline_id) => {
                    if let Some(inline_frag) = syntax.inline_fragment(*inline_id) {
                        self.visit_selection_set(inline_frag.selection_set());
                    }
                },
            }
        }
    }
}

/// Rotate a cycle (`[A, B, C, A]`) so it starts at its lexicographically
/// smallest name. Rotations of one cycle normalize to the same value.
fn normalize_cycle(cycle: &[String]) -> Vec<String> {
    let Some((_, cycle_without_repeat)) = cycle.split_last() else {
        return vec![];
    };

    let min_idx = cycle_without_repeat.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(idx, _)| idx)
        .unwrap_or(0);

    let mut normalized = Vec::with_capacity(cycle.len());
    normalized.extend_from_slice(&cycle_without_repeat[min_idx..]);
    normalized.extend_from_slice(&cycle_without_repeat[..min_idx]);
    if let Some(first) = normalized.first().cloned() {
        normalized.push(first);
    }
    normalized
}

fn format_cycle_path(cycle: &[String]) -> String {
    cycle.join(" → ")
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FragmentIndexBuildError {
    #[error("Duplicate fragment definition: `{fragment_name}`")]
    DuplicateFragmentDefinition {
        fragment_name: String,
        first_def_location: loc::SourceLocation,
        second_def_location: loc::SourceLocation,
    },

    #[error("Fragment cycle detected: {}", format_cycle_path(.cycle_path))]
    FragmentCycleDetected {
        cycle_path: Vec<String>,
    },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FragmentIndexError {
    #[error("No fragment named `{fragment_name}` is defined in the document")]
    UndefinedFragment {
        fragment_name: String,
    },
}
