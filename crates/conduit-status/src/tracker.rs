// crates/conduit-status/src/tracker.rs
// ============================================================================
// Module: Status Tracker
// Description: Keeps the latest known state per task and fans events out.
// Purpose: Give the CLI and any external observer a single query point for
//          "what is the current state of this Run", without polling the engine.
// Dependencies: conduit-core, std::sync
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::RwLock;

use conduit_core::ids::PhaseNumber;
use conduit_core::ids::TaskId;
use conduit_core::SinkError;
use conduit_core::StatusEvent;
use conduit_core::StatusSink;
use conduit_core::TaskState;

/// A point-in-time read of everything the [`Tracker`] has observed.
#[derive(Debug, Clone, Default)]
pub struct TrackerSnapshot {
    /// Latest known state of every task seen so far.
    pub task_states: BTreeMap<TaskId, TaskState>,
    /// Latest phase the Phase Manager reported advancing to.
    pub current_phase: Option<PhaseNumber>,
}

#[derive(Default)]
struct TrackerState {
    snapshot: TrackerSnapshot,
    subscribers: Vec<Arc<dyn StatusSink>>,
}

/// Fans out [`StatusEvent`]s to subscriber sinks and keeps the latest state
/// of every task for synchronous querying.
///
/// # Invariants
/// - A subscriber's delivery failure is swallowed; it never stops the
///   Tracker itself from recording the event (§4.4's persistence hook).
#[derive(Default, Clone)]
pub struct Tracker {
    state: Arc<RwLock<TrackerState>>,
}

impl Tracker {
    /// Creates an empty tracker with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `sink` to receive every future event.
    pub fn subscribe(&self, sink: Arc<dyn StatusSink>) {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.subscribers.push(sink);
    }

    /// Returns a snapshot of the latest known state.
    #[must_use]
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner).snapshot.clone()
    }
}

impl StatusSink for Tracker {
    fn observe(&self, event: &StatusEvent) -> Result<(), SinkError> {
        {
            let mut state =
                self.state.write().map_err(|_| SinkError::DeliveryFailed("tracker lock poisoned".to_string()))?;
            match event {
                StatusEvent::Transition { task_id, to, .. } => {
                    state.snapshot.task_states.insert(task_id.clone(), *to);
                }
                StatusEvent::PhaseAdvanced { phase } => {
                    state.snapshot.current_phase = Some(*phase);
                }
                StatusEvent::ArtifactPublished { .. } => {}
            }
        }
        let subscribers = {
            let state = self.state.read().map_err(|_| SinkError::DeliveryFailed("tracker lock poisoned".to_string()))?;
            state.subscribers.clone()
        };
        let mut last_error = None;
        for subscriber in &subscribers {
            if let Err(err) = subscriber.observe(event) {
                last_error = Some(err);
            }
        }
        match last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
