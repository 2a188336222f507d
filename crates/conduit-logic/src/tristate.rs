// crates/conduit-logic/src/tristate.rs
// ============================================================================
// Module: Tri-State Logic
// Description: Kleene three-valued logic: True, False, Unknown.
// Purpose: Let a condition resolver express "don't know" without lying as true or false.
// Dependencies: serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// A three-valued logic result.
///
/// # Invariants
/// - `and`/`or`/`not` follow Kleene's strong tables: `Unknown` only resolves
///   to a definite value when the other operand already determines the result
///   (e.g. `False and Unknown == False`, `True or Unknown == True`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriState {
    /// Definitely true.
    True,
    /// Definitely false.
    False,
    /// Not determinable from the available evidence.
    Unknown,
}

impl TriState {
    /// Kleene conjunction.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }

    /// Kleene disjunction.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Unknown,
        }
    }

    /// Kleene negation.
    #[must_use]
    pub const fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }

    /// Returns true only for a definite [`TriState::True`].
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}
