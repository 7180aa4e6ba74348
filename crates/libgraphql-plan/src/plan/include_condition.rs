use crate::ast;
use crate::document::DirectiveNode;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Per-request variable values, as far as include conditions need them.
pub trait VariableValues {
    /// The value of the named variable if it is bound to a boolean.
    fn boolean(&self, name: &str) -> Option<bool>;
}
impl<S: BuildHasher> VariableValues for HashMap<String, bool, S> {
    fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).copied()
    }
}
impl<S: BuildHasher> VariableValues for IndexMap<String, bool, S> {
    fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).copied()
    }
}
impl VariableValues for BTreeMap<String, ast::operation::Value> {
    fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(ast::operation::Value::Boolean(value)) => Some(*value),
            _ => None,
        }
    }
}

/// A single variable test: `$variable` (from `@include`) or `!$variable`
/// (from `@skip`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Condition {
    pub(crate) negated: bool,
    pub(crate) variable: String,
}
impl Condition {
    /// Holds when the variable is `true`.
    pub fn include_if(variable: impl Into<String>) -> Self {
        Self {
            negated: false,
            variable: variable.into(),
        }
    }

    /// Holds when the variable is `false`.
    pub fn skip_if(variable: impl Into<String>) -> Self {
        Self {
            negated: true,
            variable: variable.into(),
        }
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Missing and non-boolean variables read as `false`.
    pub fn is_satisfied(&self, variables: &(impl VariableValues + ?Sized)) -> bool {
        variables.boolean(&self.variable).unwrap_or(false) != self.negated
    }

    pub fn variable(&self) -> &str {
        self.variable.as_str()
    }
}
impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        write!(f, "${}", self.variable)
    }
}

/// A conjunction of [`Condition`]s: the directives along one syntactic path
/// to a selection. The empty clause always holds.
///
/// Conditions are kept sorted and free of duplicates so equal clauses
/// compare equal regardless of the order directives were written in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ConditionClause(SmallVec<[Condition; 2]>);
impl ConditionClause {
    pub fn always() -> Self {
        Self(SmallVec::new())
    }

    /// This clause plus the `@skip`/`@include` directives in `directives`.
    ///
    /// Returns `None` when the result can never hold: a literal
    /// `@skip(if: true)` or `@include(if: false)`, or a variable required to
    /// be both `true` and `false`.
    pub fn and_directives(&self, directives: &[DirectiveNode]) -> Option<Self> {
        let mut clause = self.to_owned();
        for directive in directives {
            let negated = match directive.name() {
                "include" => false,
                "skip" => true,
                _ => continue,
            };

            match directive.argument("if") {
                Some(ast::operation::Value::Boolean(value)) => {
                    if *value == negated {
                        return None;
                    }
                },
                Some(ast::operation::Value::Variable(variable)) => {
                    clause = clause.and(Condition {
                        negated,
                        variable: variable.to_owned(),
                    })?;
                },
                _ => (),
            }
        }
        Some(clause)
    }

    /// This clause with `condition` added, or `None` if the clause already
    /// requires the opposite.
    pub fn and(mut self, condition: Condition) -> Option<Self> {
        let contradicts = self.0.iter().any(|existing| {
            existing.variable == condition.variable
                && existing.negated != condition.negated
        });
        if contradicts {
            return None;
        }
        if let Err(pos) = self.0.binary_search(&condition) {
            self.0.insert(pos, condition);
        }
        Some(self)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }

    pub fn is_always(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_satisfied(&self, variables: &(impl VariableValues + ?Sized)) -> bool {
        self.0.iter().all(|condition| condition.is_satisfied(variables))
    }

    /// Whether every condition of `self` also appears in `other`. If so,
    /// `other` holds only when `self` does, and is redundant in a
    /// disjunction with `self`.
    pub fn subsumes(&self, other: &ConditionClause) -> bool {
        self.0.iter().all(|condition| other.0.contains(condition))
    }
}
impl std::fmt::Display for ConditionClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "true");
        }
        for (idx, condition) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

/// When a merged [`Selection`](crate::plan::Selection) is part of the
/// response: always, or when any one of its clauses holds.
///
/// A selection reached through several syntactic paths carries one clause
/// per path. One unconditional path makes the whole selection
/// [`IncludeCondition::Always`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncludeCondition {
    Always,
    /// An empty list means no path can ever include the selection.
    Conditional(Vec<ConditionClause>),
}
impl IncludeCondition {
    pub fn from_clause(clause: ConditionClause) -> Self {
        let mut condition = Self::never();
        condition.add_clause(clause);
        condition
    }

    pub fn never() -> Self {
        Self::Conditional(vec![])
    }

    /// Merge in the clause of one more path to the selection.
    pub fn add_clause(&mut self, clause: ConditionClause) {
        let Self::Conditional(clauses) = self else {
            return;
        };

        if clause.is_always() {
            *self = Self::Always;
            return;
        }
        if clauses.iter().any(|existing| existing.subsumes(&clause)) {
            return;
        }
        clauses.retain(|existing| !clause.subsumes(existing));
        clauses.push(clause);
    }

    pub fn clauses(&self) -> &[ConditionClause] {
        match self {
            Self::Always => &[],
            Self::Conditional(clauses) => clauses,
        }
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, Self::Conditional(_))
    }

    pub fn is_included(&self, variables: &(impl VariableValues + ?Sized)) -> bool {
        match self {
            Self::Always => true,
            Self::Conditional(clauses) =>
                clauses.iter().any(|clause| clause.is_satisfied(variables)),
        }
    }

    /// Whether no variable values could ever include the selection.
    pub fn is_never(&self) -> bool {
        matches!(self, Self::Conditional(clauses) if clauses.is_empty())
    }
}
