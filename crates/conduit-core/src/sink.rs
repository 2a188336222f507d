// crates/conduit-core/src/sink.rs
// ============================================================================
// Module: Status Sink
// Description: The persistence/observation hook offered on every state transition.
// Purpose: Let the State Machine notify a single sink per transition without the
//          mainline blocking on, or failing because of, a slow or broken observer.
// Dependencies: thiserror, crate::ids, crate::task
// ============================================================================

//! ## Overview
//! `StatusSink` is the seam the Status Tracker, the optional SQLite store, and
//! any ad-hoc logging sink all implement. A sink failure is recorded but never
//! fails the state transition it was notified about (§4.4's persistence hook).

use crate::ids::ArtifactId;
use crate::ids::PhaseNumber;
use crate::ids::TaskId;
use crate::task::TaskState;

/// Errors a [`StatusSink`] may report back to its caller.
///
/// # Invariants
/// - Never causes the originating state transition to fail; callers log and continue.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Delivery to the sink's backing destination failed.
    #[error("status sink delivery failed: {0}")]
    DeliveryFailed(String),
}

/// One observable event crossing a component boundary.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StatusEvent {
    /// A task moved from `from` to `to`.
    Transition {
        /// Task that transitioned.
        task_id: TaskId,
        /// State before the transition.
        from: TaskState,
        /// State after the transition.
        to: TaskState,
        /// Monotonic timestamp, in milliseconds since Run start.
        at_ms: u64,
        /// Stable reason code, e.g. `predecessor_failed`, `quality_gate:security`.
        reason: Option<String>,
    },
    /// The Phase Manager advanced to a new phase.
    PhaseAdvanced {
        /// New current phase number.
        phase: PhaseNumber,
    },
    /// An artifact was published to the Artifact store.
    ArtifactPublished {
        /// Artifact identifier.
        artifact_id: ArtifactId,
        /// Task that produced it.
        producer: TaskId,
    },
}

/// A one-way observer of [`StatusEvent`]s.
///
/// # Invariants
/// - Implementations must not block the caller for longer than a bounded,
///   local operation (e.g. appending to an in-memory log or a bounded channel).
pub trait StatusSink: Send + Sync {
    /// Delivers one event to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when delivery fails. The caller logs this and
    /// continues; it never propagates into the state transition.
    fn observe(&self, event: &StatusEvent) -> Result<(), SinkError>;
}
