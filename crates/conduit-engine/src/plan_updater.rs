// crates/conduit-engine/src/plan_updater.rs
// ============================================================================
// Module: Plan Updater
// Description: Writes each task's terminal outcome back by identifier.
// Purpose: Give callers one idempotent place to read a Run's final per-task
//          state without re-deriving it from the completion queue.
// Dependencies: conduit-core
// ============================================================================

//! ## Overview
//! Writes are addressed by [`TaskId`], never by position, and writing the
//! same outcome twice is a no-op: the outcome map converges to whatever was
//! written last, and writing identical content twice leaves it unchanged.

use std::collections::BTreeMap;

use conduit_core::ids::ArtifactId;
use conduit_core::ids::TaskId;
use conduit_core::Severity;
use conduit_core::TaskState;
use conduit_core::ValidationFinding;

/// Counts of findings by severity, rolled up across every gate that ran for a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindingsSummary {
    /// Count of [`Severity::Critical`] findings.
    pub critical: usize,
    /// Count of [`Severity::Error`] findings.
    pub error: usize,
    /// Count of [`Severity::Warning`] findings.
    pub warning: usize,
    /// Count of [`Severity::Info`] findings.
    pub info: usize,
}

impl FindingsSummary {
    /// Builds a summary by counting findings per severity.
    #[must_use]
    pub fn from_findings(findings: &[ValidationFinding]) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Error => summary.error += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }
}

/// The per-task fields written back to the plan, per `§4.9`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTaskOutcome {
    /// Terminal state the task ended in.
    pub final_state: TaskState,
    /// Number of attempts made.
    pub attempts: u32,
    /// Total elapsed time across every attempt, in milliseconds.
    pub elapsed_ms: u64,
    /// Identifiers of artifacts this task produced (canonical, post-dedup).
    pub artifact_ids: Vec<ArtifactId>,
    /// Rolled-up finding counts across the gate chain.
    pub findings_summary: FindingsSummary,
    /// Weighted quality score from the Gate Runner, `None` if gates never ran.
    pub quality_score: Option<f64>,
}

/// Writes back terminal task outcomes into a by-identifier map.
#[derive(Debug, Default)]
pub struct PlanUpdater {
    outcomes: BTreeMap<TaskId, PlanTaskOutcome>,
}

impl PlanUpdater {
    /// Builds an empty updater.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes (or overwrites) `task_id`'s outcome. Writing the same content
    /// twice leaves the map unchanged.
    pub fn record(&mut self, task_id: TaskId, outcome: PlanTaskOutcome) {
        self.outcomes.insert(task_id, outcome);
    }

    /// Looks up a previously recorded outcome.
    #[must_use]
    pub fn outcome(&self, task_id: &TaskId) -> Option<&PlanTaskOutcome> {
        self.outcomes.get(task_id)
    }

    /// Returns every recorded outcome, keyed by task identifier.
    #[must_use]
    pub fn outcomes(&self) -> &BTreeMap<TaskId, PlanTaskOutcome> {
        &self.outcomes
    }
}
