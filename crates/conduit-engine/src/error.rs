// crates/conduit-engine/src/error.rs
// ============================================================================
// Module: Orchestration Error
// Description: The top-level error unifying every failure domain in the engine.
// Purpose: Give `OrchestrationEngine::run` one `Result` type while keeping each
//          stage's own error enum as the authoritative source for its domain.
// Dependencies: thiserror, conduit-core, conduit-contract, conduit-transport
// ============================================================================

//! ## Overview
//! One `thiserror`-derived enum per failure domain, unified here via `#[from]`.
//! A caller matching on [`OrchestrationError`] either inspects the domain
//! variant directly or calls [`OrchestrationError::category`] to fall back to
//! the closed [`conduit_core::ErrorCategory`] taxonomy.

use conduit_contract::RegistryError;
use conduit_core::ErrorCategory;
use conduit_core::ExtractionError;
use conduit_core::TaskError;
use conduit_transport::InvokeError;

use crate::graph::GraphError;

/// Unifies every failure domain reachable from [`crate::run::OrchestrationEngine::run`].
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    /// A fatal extraction-time error; the Run never started executing tasks.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// A fatal dependency-graph error surfaced outside extraction (e.g. a
    /// caller-supplied graph rather than an extracted one).
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A per-task error that escalated past the Decision Engine to `HALT`.
    #[error(transparent)]
    Task(#[from] TaskError),
    /// A capability or schema registry error.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A transport-level invocation error that could not be classified into
    /// a per-task error (e.g. raised outside the per-attempt retry loop).
    #[error(transparent)]
    Transport(#[from] InvokeError),
    /// An unclassified internal failure; always logged with full context.
    #[error("internal orchestration error: {0}")]
    Internal(String),
}

impl OrchestrationError {
    /// Maps this error onto the closed [`ErrorCategory`] taxonomy, for
    /// callers that only care about retry/escalation semantics.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Extraction(err) => err.category(),
            Self::Graph(_) => ErrorCategory::CycleDetected,
            Self::Task(err) => err.category.clone(),
            Self::Registry(_) => ErrorCategory::SchemaUnknown,
            Self::Transport(InvokeError::Timeout { .. }) => ErrorCategory::Timeout,
            Self::Transport(InvokeError::Cancelled) => ErrorCategory::Cancelled,
            Self::Transport(_) => ErrorCategory::TransportError,
            Self::Internal(_) => ErrorCategory::InternalError,
        }
    }
}
