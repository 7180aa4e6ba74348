use crate::ast;
use crate::document::DirectiveNode;
use crate::document::FieldId;
use crate::document::FieldNode;
use crate::document::FragmentSpreadId;
use crate::document::FragmentSpreadNode;
use crate::document::InlineFragmentId;
use crate::document::InlineFragmentNode;
use crate::document::SelectionNode;
use crate::document::SelectionSetId;
use crate::document::SelectionSetNode;
use crate::loc;
use std::path::Path;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct IdBases {
    fields: u32,
    fragment_spreads: u32,
    inline_fragments: u32,
    selection_sets: u32,
}

/// Flat storage for lowered executable syntax, addressed by typed ids.
///
/// An [`ExecutableDocument`](crate::document::ExecutableDocument) owns one
/// arena for everything it parsed. Compilation keeps a second, synthetic
/// arena for syntax injected by optimizers; its ids start where the
/// document's end, so an id never means two different nodes within one
/// compiled operation.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxArena {
    bases: IdBases,
    fields: Vec<FieldNode>,
    file_path: Option<PathBuf>,
    fragment_spreads: Vec<FragmentSpreadNode>,
    inline_fragments: Vec<InlineFragmentNode>,
    selection_sets: Vec<SelectionSetNode>,
    synthetic: bool,
}
impl SyntaxArena {
    pub(crate) fn for_document(file_path: Option<PathBuf>) -> Self {
        Self {
            bases: IdBases::default(),
            fields: vec![],
            file_path,
            fragment_spreads: vec![],
            inline_fragments: vec![],
            selection_sets: vec![],
            synthetic: false,
        }
    }

    /// An empty arena for synthesized syntax whose ids continue after every
    /// id allocated in `document`.
    pub(crate) fn synthetic_after(document: &SyntaxArena) -> Self {
        let len = |n: usize| n as u32;
        Self {
            bases: IdBases {
                fields: document.bases.fields + len(document.fields.len()),
                fragment_spreads:
                    document.bases.fragment_spreads + len(document.fragment_spreads.len()),
                inline_fragments:
                    document.bases.inline_fragments + len(document.inline_fragments.len()),
                selection_sets:
                    document.bases.selection_sets + len(document.selection_sets.len()),
            },
            fields: vec![],
            file_path: None,
            fragment_spreads: vec![],
            inline_fragments: vec![],
            selection_sets: vec![],
            synthetic: true,
        }
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldNode> {
        id.0.checked_sub(self.bases.fields)
            .and_then(|idx| self.fields.get(idx as usize))
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn fragment_spread(&self, id: FragmentSpreadId) -> Option<&FragmentSpreadNode> {
        id.0.checked_sub(self.bases.fragment_spreads)
            .and_then(|idx| self.fragment_spreads.get(idx as usize))
    }

    pub fn inline_fragment(&self, id: InlineFragmentId) -> Option<&InlineFragmentNode> {
        id.0.checked_sub(self.bases.inline_fragments)
            .and_then(|idx| self.inline_fragments.get(idx as usize))
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn selection_set(&self, id: SelectionSetId) -> Option<&SelectionSetNode> {
        id.0.checked_sub(self.bases.selection_sets)
            .and_then(|idx| self.selection_sets.get(idx as usize))
    }

    /// Allocate a new [`SelectionSetNode`] listing the same selections as
    /// `source`, under a fresh id.
    pub(crate) fn copy_selection_set(&mut self, source: &SelectionSetNode) -> SelectionSetId {
        let id = self.next_selection_set_id();
        self.selection_sets.push(SelectionSetNode {
            id,
            location: source.location.to_owned(),
            selections: source.selections.to_owned(),
        });
        id
    }

    pub(crate) fn lower_directives(
        &self,
        directives: &[ast::operation::Directive],
    ) -> Vec<DirectiveNode> {
        directives.iter().map(|directive| DirectiveNode {
            arguments: directive.arguments.to_owned(),
            location: self.location(directive.position),
            name: directive.name.to_owned(),
        }).collect()
    }

    pub(crate) fn lower_field(&mut self, field: &ast::operation::Field) -> FieldId {
        let selection_set =
            if field.selection_set.items.is_empty() {
                None
            } else {
                Some(self.lower_selection_set(&field.selection_set))
            };

        let directives = self.lower_directives(&field.directives);
        let location = self.location(field.position);
        let id = FieldId(self.bases.fields + self.fields.len() as u32);
        self.fields.push(FieldNode {
            alias: field.alias.to_owned(),
            arguments: field.arguments.to_owned(),
            directives,
            id,
            location,
            name: field.name.to_owned(),
            selection_set,
        });
        id
    }

    pub(crate) fn lower_selection_set(
        &mut self,
        selection_set: &ast::operation::SelectionSet,
    ) -> SelectionSetId {
        // Reserve the slot first so a parent's id precedes its children's.
        let id = self.next_selection_set_id();
        let slot = self.selection_sets.len();
        let location = self.location(selection_set.span.0);
        self.selection_sets.push(SelectionSetNode {
            id,
            location,
            selections: vec![],
        });

        let mut selections = Vec::with_capacity(selection_set.items.len());
        for item in &selection_set.items {
            use ast::operation::Selection;
            selections.push(match item {
                Selection::Field(field) =>
                    SelectionNode::Field(self.lower_field(field)),

                Selection::FragmentSpread(spread) => {
                    let directives = self.lower_directives(&spread.directives);
                    let location = self.location(spread.position);
                    let id = FragmentSpreadId(
                        self.bases.fragment_spreads + self.fragment_spreads.len() as u32,
                    );
                    self.fragment_spreads.push(FragmentSpreadNode {
                        directives,
                        fragment_name: spread.fragment_name.to_owned(),
                        id,
                        location,
                    });
                    SelectionNode::FragmentSpread(id)
                },

                Selection::InlineFragment(inline_frag) => {
                    let child_set = self.lower_selection_set(&inline_frag.selection_set);
                    let directives = self.lower_directives(&inline_frag.directives);
                    let location = self.location(inline_frag.position);
                    let id = InlineFragmentId(
                        self.bases.inline_fragments + self.inline_fragments.len() as u32,
                    );
                    self.inline_fragments.push(InlineFragmentNode {
                        directives,
                        id,
                        location,
                        selection_set: child_set,
                        type_condition: inline_frag.type_condition.as_ref().map(
                            |ast::operation::TypeCondition::On(type_name)| type_name.to_owned(),
                        ),
                    });
                    SelectionNode::InlineFragment(id)
                },
            });
        }

        self.selection_sets[slot].selections = selections;
        id
    }

    pub(crate) fn location(&self, pos: ast::AstPos) -> loc::SourceLocation {
        if self.synthetic {
            loc::SourceLocation::Synthetic
        } else {
            loc::SourceLocation::ExecutableDocument(
                loc::FilePosition::from_pos(self.file_path.as_deref(), pos),
            )
        }
    }

    fn next_selection_set_id(&self) -> SelectionSetId {
        SelectionSetId(self.bases.selection_sets + self.selection_sets.len() as u32)
    }
}

/// Resolves syntax ids against a document arena and (optionally) the
/// synthetic arena of a compiled operation.
#[derive(Clone, Copy, Debug)]
pub struct SyntaxView<'a> {
    document: &'a SyntaxArena,
    synthetic: Option<&'a SyntaxArena>,
}
impl<'a> SyntaxView<'a> {
    pub fn new(document: &'a SyntaxArena, synthetic: Option<&'a SyntaxArena>) -> Self {
        Self {
            document,
            synthetic,
        }
    }

    pub fn field(&self, id: FieldId) -> Option<&'a FieldNode> {
        self.document.field(id)
            .or_else(|| self.synthetic.and_then(|arena| arena.field(id)))
    }

    pub fn fragment_spread(&self, id: FragmentSpreadId) -> Option<&'a FragmentSpreadNode> {
        self.document.fragment_spread(id)
            .or_else(|| self.synthetic.and_then(|arena| arena.fragment_spread(id)))
    }

    pub fn inline_fragment(&self, id: InlineFragmentId) -> Option<&'a InlineFragmentNode> {
        self.document.inline_fragment(id)
            .or_else(|| self.synthetic.and_then(|arena| arena.inline_fragment(id)))
    }

    pub fn selection_set(&self, id: SelectionSetId) -> Option<&'a SelectionSetNode> {
        self.document.selection_set(id)
            .or_else(|| self.synthetic.and_then(|arena| arena.selection_set(id)))
    }
}
