use crate::ast;
use crate::document::FieldId;
use crate::document::FragmentSpreadId;
use crate::document::InlineFragmentId;
use crate::document::OperationKind;
use crate::document::SelectionSetId;
use crate::loc;
use crate::types::TypeAnnotation;

/// A directive applied to some executable syntax (e.g. `@include(if: $v)`).
/// Arguments are kept as unresolved syntax.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveNode {
    pub(crate) arguments: Vec<(String, ast::operation::Value)>,
    pub(crate) location: loc::SourceLocation,
    pub(crate) name: String,
}
impl DirectiveNode {
    pub fn argument(&self, name: &str) -> Option<&ast::operation::Value> {
        self.arguments.iter()
            .find(|(arg_name, _)| arg_name == name)
            .map(|(_, value)| value)
    }

    pub fn arguments(&self) -> &[(String, ast::operation::Value)] {
        &self.arguments
    }

    pub fn location(&self) -> &loc::SourceLocation {
        &self.location
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// A field as written in an executable document (or injected by a
/// [`SelectionOptimizer`](crate::plan::SelectionOptimizer)).
#[derive(Clone, Debug, PartialEq)]
pub struct FieldNode {
    pub(crate) alias: Option<String>,
    pub(crate) arguments: Vec<(String, ast::operation::Value)>,
    pub(crate) directives: Vec<DirectiveNode>,
    pub(crate) id: FieldId,
    pub(crate) location: loc::SourceLocation,
    pub(crate) name: String,
    pub(crate) selection_set: Option<SelectionSetId>,
}
impl FieldNode {
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn arguments(&self) -> &[(String, ast::operation::Value)] {
        &self.arguments
    }

    pub fn directives(&self) -> &[DirectiveNode] {
        &self.directives
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn location(&self) -> &loc::SourceLocation {
        &self.location
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The key this field's value is written under in a response: its alias
    /// if it has one, otherwise its name.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(self.name.as_str())
    }

    pub fn selection_set(&self) -> Option<SelectionSetId> {
        self.selection_set
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentDefinitionNode {
    pub(crate) directives: Vec<DirectiveNode>,
    pub(crate) location: loc::SourceLocation,
    pub(crate) name: String,
    pub(crate) selection_set: SelectionSetId,
    pub(crate) type_condition: String,
}
impl FragmentDefinitionNode {
    pub fn directives(&self) -> &[DirectiveNode] {
        &self.directives
    }

    pub fn location(&self) -> &loc::SourceLocation {
        &self.location
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn selection_set(&self) -> SelectionSetId {
        self.selection_set
    }

    pub fn type_condition(&self) -> &str {
        self.type_condition.as_str()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpreadNode {
    pub(crate) directives: Vec<DirectiveNode>,
    pub(crate) fragment_name: String,
    pub(crate) id: FragmentSpreadId,
    pub(crate) location: loc::SourceLocation,
}
impl FragmentSpreadNode {
    pub fn directives(&self) -> &[DirectiveNode] {
        &self.directives
    }

    pub fn fragment_name(&self) -> &str {
        self.fragment_name.as_str()
    }

    pub fn id(&self) -> FragmentSpreadId {
        self.id
    }

    pub fn location(&self) -> &loc::SourceLocation {
        &self.location
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragmentNode {
    pub(crate) directives: Vec<DirectiveNode>,
    pub(crate) id: InlineFragmentId,
    pub(crate) location: loc::SourceLocation,
    pub(crate) selection_set: SelectionSetId,
    pub(crate) type_condition: Option<String>,
}
impl InlineFragmentNode {
    pub fn directives(&self) -> &[DirectiveNode] {
        &self.directives
    }

    pub fn id(&self) -> InlineFragmentId {
        self.id
    }

    pub fn location(&self) -> &loc::SourceLocation {
        &self.location
    }

    pub fn selection_set(&self) -> SelectionSetId {
        self.selection_set
    }

    /// `None` for a type-less inline fragment (`... @include(if: $v) { }`),
    /// which applies to whatever type encloses it.
    pub fn type_condition(&self) -> Option<&str> {
        self.type_condition.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperationDefinitionNode {
    pub(crate) directives: Vec<DirectiveNode>,
    pub(crate) kind: OperationKind,
    pub(crate) location: loc::SourceLocation,
    pub(crate) name: Option<String>,
    pub(crate) selection_set: SelectionSetId,
    pub(crate) variable_definitions: Vec<VariableDefinitionNode>,
}
impl OperationDefinitionNode {
    pub fn directives(&self) -> &[DirectiveNode] {
        &self.directives
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn location(&self) -> &loc::SourceLocation {
        &self.location
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn selection_set(&self) -> SelectionSetId {
        self.selection_set
    }

    pub fn variable_definitions(&self) -> &[VariableDefinitionNode] {
        &self.variable_definitions
    }
}

/// One entry in a selection set, pointing at the arena node it refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionNode {
    Field(FieldId),
    FragmentSpread(FragmentSpreadId),
    InlineFragment(InlineFragmentId),
}

/// The braces-delimited list of selections at one point in a document.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionSetNode {
    pub(crate) id: SelectionSetId,
    pub(crate) location: loc::SourceLocation,
    pub(crate) selections: Vec<SelectionNode>,
}
impl SelectionSetNode {
    pub fn id(&self) -> SelectionSetId {
        self.id
    }

    pub fn location(&self) -> &loc::SourceLocation {
        &self.location
    }

    pub fn selections(&self) -> &[SelectionNode] {
        &self.selections
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinitionNode {
    pub(crate) default_value: Option<ast::operation::Value>,
    pub(crate) location: loc::SourceLocation,
    pub(crate) name: String,
    pub(crate) type_annotation: TypeAnnotation,
}
impl VariableDefinitionNode {
    pub fn default_value(&self) -> Option<&ast::operation::Value> {
        self.default_value.as_ref()
    }

    pub fn location(&self) -> &loc::SourceLocation {
        &self.location
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn type_annotation(&self) -> &TypeAnnotation {
        &self.type_annotation
    }
}
