// crates/conduit-logic/src/requirement.rs
// ============================================================================
// Module: Requirement Trees
// Description: Generic boolean-requirement trees evaluated over tri-state conditions.
// Purpose: Represent a Decision Engine custom rule's predicate as data, not code.
// Dependencies: crate::tristate
// ============================================================================

use crate::tristate::TriState;

/// Resolves a leaf condition `P` to a tri-state value for the current context.
///
/// # Invariants
/// - Must never panic; an unknown or unresolvable condition returns
///   [`TriState::Unknown`] rather than failing evaluation of the whole tree.
pub trait ConditionResolver<P> {
    /// Resolves one condition.
    fn resolve(&self, condition: &P) -> TriState;
}

/// A boolean-requirement tree over conditions of type `P`.
///
/// # Invariants
/// - `AtLeast { n, of }` is true iff at least `n` of `of` evaluate to `True`,
///   false iff so many evaluate to `False` that reaching `n` trues is
///   impossible, and `Unknown` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement<P> {
    /// A single leaf condition.
    Condition(P),
    /// True iff every child is true.
    And(Vec<Requirement<P>>),
    /// True iff any child is true.
    Or(Vec<Requirement<P>>),
    /// Negation of one child.
    Not(Box<Requirement<P>>),
    /// True iff at least `n` children are true.
    AtLeast {
        /// Minimum number of true children required.
        n: usize,
        /// Children evaluated for this threshold.
        of: Vec<Requirement<P>>,
    },
    /// A named group of children, evaluated as [`Requirement::And`] but
    /// carrying a label for diagnostics and rule-table reporting.
    Group {
        /// Group label.
        name: String,
        /// Children of the group.
        of: Vec<Requirement<P>>,
    },
}

impl<P> Requirement<P> {
    /// Builds a leaf condition requirement.
    pub fn condition(condition: P) -> Self {
        Self::Condition(condition)
    }

    /// Builds an `and` requirement.
    #[must_use]
    pub fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    /// Builds an `or` requirement.
    #[must_use]
    pub fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    /// Builds a `not` requirement.
    #[must_use]
    pub fn negate(child: Self) -> Self {
        Self::Not(Box::new(child))
    }

    /// Builds an `at_least` requirement.
    #[must_use]
    pub fn at_least(n: usize, of: Vec<Self>) -> Self {
        Self::AtLeast { n, of }
    }

    /// Builds a named `require_group` requirement.
    pub fn require_group(name: impl Into<String>, of: Vec<Self>) -> Self {
        Self::Group { name: name.into(), of }
    }

    /// Evaluates the tree against `resolver`, applying Kleene semantics at
    /// every internal node.
    pub fn eval(&self, resolver: &impl ConditionResolver<P>) -> TriState {
        match self {
            Self::Condition(condition) => resolver.resolve(condition),
            Self::Not(child) => child.eval(resolver).not(),
            Self::And(children) | Self::Group { of: children, .. } => {
                children.iter().fold(TriState::True, |acc, child| acc.and(child.eval(resolver)))
            }
            Self::Or(children) => {
                children.iter().fold(TriState::False, |acc, child| acc.or(child.eval(resolver)))
            }
            Self::AtLeast { n, of } => eval_at_least(*n, of, resolver),
        }
    }
}

fn eval_at_least<P>(n: usize, of: &[Requirement<P>], resolver: &impl ConditionResolver<P>) -> TriState {
    let mut trues = 0usize;
    let mut unknowns = 0usize;
    for child in of {
        match child.eval(resolver) {
            TriState::True => trues += 1,
            TriState::Unknown => unknowns += 1,
            TriState::False => {}
        }
    }
    if trues >= n {
        TriState::True
    } else if trues + unknowns < n {
        TriState::False
    } else {
        TriState::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Cond {
        A,
        B,
        C,
    }

    struct FixedResolver(TriState, TriState, TriState);

    impl ConditionResolver<Cond> for FixedResolver {
        fn resolve(&self, condition: &Cond) -> TriState {
            match condition {
                Cond::A => self.0,
                Cond::B => self.1,
                Cond::C => self.2,
            }
        }
    }

    #[test]
    fn and_short_circuits_on_false() {
        let resolver = FixedResolver(TriState::False, TriState::Unknown, TriState::True);
        let req = Requirement::and(vec![
            Requirement::condition(Cond::A),
            Requirement::condition(Cond::B),
        ]);
        assert_eq!(req.eval(&resolver), TriState::False);
    }

    #[test]
    fn at_least_two_of_three() {
        let resolver = FixedResolver(TriState::True, TriState::True, TriState::False);
        let req = Requirement::at_least(
            2,
            vec![
                Requirement::condition(Cond::A),
                Requirement::condition(Cond::B),
                Requirement::condition(Cond::C),
            ],
        );
        assert_eq!(req.eval(&resolver), TriState::True);
    }

    #[test]
    fn at_least_returns_unknown_when_undetermined() {
        let resolver = FixedResolver(TriState::True, TriState::Unknown, TriState::Unknown);
        let req = Requirement::at_least(
            3,
            vec![
                Requirement::condition(Cond::A),
                Requirement::condition(Cond::B),
                Requirement::condition(Cond::C),
            ],
        );
        assert_eq!(req.eval(&resolver), TriState::Unknown);
    }
}
