// crates/conduit-logic/src/lib.rs
// ============================================================================
// Module: Conduit Logic
// Description: Tri-state boolean-requirement trees and their DSL grammar.
// Purpose: Back the Decision Engine's custom-rule predicates with a small,
//          fail-closed boolean logic independent of the orchestration domain.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! `conduit-logic` is domain-agnostic: it knows nothing about Tasks or
//! Capabilities. A [`Requirement<P>`] tree is generic over a condition type
//! `P`; the Decision Engine instantiates it with its own condition enum and
//! supplies a [`ConditionResolver`] that looks up tri-state values for that
//! run. Missing or ambiguous conditions resolve to [`TriState::Unknown`]
//! rather than panicking, so a misconfigured custom rule degrades instead of
//! crashing the Run.

#![deny(missing_docs)]

pub mod dsl;
/// Boolean-requirement tree types and evaluation.
pub mod requirement;
/// Tri-state boolean value used for condition resolution.
pub mod tristate;

pub use dsl::DslError;
pub use dsl::parse;
pub use requirement::ConditionResolver;
pub use requirement::Requirement;
pub use tristate::TriState;
