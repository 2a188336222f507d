// crates/conduit-engine/src/metrics.rs
// ============================================================================
// Module: Metrics Collector
// Description: Lock-free per-component counters, aggregated on read.
// Purpose: Give the CLI and any external observer a cheap, contention-free
//          way to answer "how much work has this Run done so far".
// Dependencies: conduit-core, std::sync::atomic
// ============================================================================

//! ## Overview
//! Every counter is an independent [`AtomicU64`] updated with
//! [`Ordering::Relaxed`]: counters never need to be read-modify-written
//! together, so there is nothing to synchronize beyond each individual
//! increment. [`MetricsCollector::snapshot`] reads them all once to build an
//! immutable [`MetricsSnapshot`], which is the unit external observers see.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use conduit_core::SinkError;
use conduit_core::StatusEvent;
use conduit_core::StatusSink;
use conduit_core::TaskState;

/// A point-in-time read of every counter the [`MetricsCollector`] has observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total state transitions observed, of any kind.
    pub transitions_total: u64,
    /// Transitions into `RUNNING`.
    pub tasks_started: u64,
    /// Transitions into `SUCCEEDED`.
    pub tasks_succeeded: u64,
    /// Transitions into `FAILED`.
    pub tasks_failed: u64,
    /// Transitions into `RETRYING`.
    pub tasks_retried: u64,
    /// Transitions into `SKIPPED`.
    pub tasks_skipped: u64,
    /// Transitions into `CANCELLED`.
    pub tasks_cancelled: u64,
    /// Transitions into `VALIDATED`.
    pub tasks_validated: u64,
    /// Transitions into `REPORTED`.
    pub tasks_reported: u64,
    /// Number of phase advances observed.
    pub phases_advanced: u64,
    /// Number of artifacts published.
    pub artifacts_published: u64,
}

/// Lock-free counters per component, aggregated on read.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    transitions_total: AtomicU64,
    tasks_started: AtomicU64,
    tasks_succeeded: AtomicU64,
    tasks_failed: AtomicU64,
    tasks_retried: AtomicU64,
    tasks_skipped: AtomicU64,
    tasks_cancelled: AtomicU64,
    tasks_validated: AtomicU64,
    tasks_reported: AtomicU64,
    phases_advanced: AtomicU64,
    artifacts_published: AtomicU64,
}

impl MetricsCollector {
    /// Builds a collector with every counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every counter into an immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            transitions_total: self.transitions_total.load(Ordering::Relaxed),
            tasks_started: self.tasks_started.load(Ordering::Relaxed),
            tasks_succeeded: self.tasks_succeeded.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            tasks_retried: self.tasks_retried.load(Ordering::Relaxed),
            tasks_skipped: self.tasks_skipped.load(Ordering::Relaxed),
            tasks_cancelled: self.tasks_cancelled.load(Ordering::Relaxed),
            tasks_validated: self.tasks_validated.load(Ordering::Relaxed),
            tasks_reported: self.tasks_reported.load(Ordering::Relaxed),
            phases_advanced: self.phases_advanced.load(Ordering::Relaxed),
            artifacts_published: self.artifacts_published.load(Ordering::Relaxed),
        }
    }

    fn counter_for(&self, state: TaskState) -> Option<&AtomicU64> {
        match state {
            TaskState::Running => Some(&self.tasks_started),
            TaskState::Succeeded => Some(&self.tasks_succeeded),
            TaskState::Failed => Some(&self.tasks_failed),
            TaskState::Retrying => Some(&self.tasks_retried),
            TaskState::Skipped => Some(&self.tasks_skipped),
            TaskState::Cancelled => Some(&self.tasks_cancelled),
            TaskState::Validated => Some(&self.tasks_validated),
            TaskState::Reported => Some(&self.tasks_reported),
            TaskState::Pending | TaskState::Scheduled | TaskState::Ready => None,
        }
    }
}

impl StatusSink for MetricsCollector {
    fn observe(&self, event: &StatusEvent) -> Result<(), SinkError> {
        match event {
            StatusEvent::Transition { to, .. } => {
                self.transitions_total.fetch_add(1, Ordering::Relaxed);
                if let Some(counter) = self.counter_for(*to) {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            }
            StatusEvent::PhaseAdvanced { .. } => {
                self.phases_advanced.fetch_add(1, Ordering::Relaxed);
            }
            StatusEvent::ArtifactPublished { .. } => {
                self.artifacts_published.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}
