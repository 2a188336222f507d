// crates/conduit-engine/src/aggregator.rs
// ============================================================================
// Module: Result Aggregator
// Description: Deduplicates artifacts by content hash, builds the lineage
//              graph, and computes the Run's overall status.
// Purpose: Turn per-task outcomes into one coherent Run result.
// Dependencies: conduit-core
// ============================================================================

//! ## Overview
//! Two artifacts with equal [`ContentHash`] are the same artifact (data
//! model invariant): the first one recorded under a given hash becomes
//! canonical, every later one becomes an [`ArtifactRef`] pointing at it. The
//! [`LineageRecord`] for an artifact is only ever written once, at the point
//! it is first recorded as canonical, so it never drifts from the artifact it
//! describes.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use conduit_core::hashing::ContentHash;
use conduit_core::ids::ArtifactId;
use conduit_core::ids::TaskId;
use conduit_core::Artifact;
use conduit_core::ArtifactRef;
use conduit_core::LineageRecord;
use conduit_core::RunStatus;
use conduit_core::TaskState;
use conduit_core::ValidationFinding;

/// The final outcome recorded for one task.
#[derive(Debug, Clone)]
pub struct TaskOutcomeSummary {
    /// Task this summary describes.
    pub task_id: TaskId,
    /// Terminal state the task ended in.
    pub final_state: TaskState,
    /// Number of attempts made.
    pub attempts: u32,
    /// Total wall-clock time spent on this task, across every attempt.
    pub elapsed_ms: u64,
    /// Weighted quality score from the Gate Runner, `None` if gates never ran
    /// (e.g. the task failed before producing output).
    pub quality_score: Option<f64>,
    /// Every finding accumulated across the gate chain.
    pub findings: Vec<ValidationFinding>,
    /// Whether `required` was set on the source task.
    pub required: bool,
}

/// The aggregated result of a completed (or halted) Run.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    /// Canonical artifacts, one per distinct content hash.
    pub artifacts: Vec<Artifact>,
    /// Cross-references for artifacts that deduplicated onto a canonical one.
    pub artifact_refs: Vec<ArtifactRef>,
    /// One lineage record per canonical artifact.
    pub lineage: Vec<LineageRecord>,
    /// Per-task outcome summaries, in the order tasks were recorded.
    pub task_summaries: Vec<TaskOutcomeSummary>,
    /// Overall Run status computed from the task summaries.
    pub status: RunStatus,
}

/// Accumulates per-task outcomes into one aggregated, deduplicated result.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    canonical_by_hash: BTreeMap<ContentHash, ArtifactId>,
    canonical_artifacts: Vec<Artifact>,
    artifact_refs: Vec<ArtifactRef>,
    lineage: Vec<LineageRecord>,
    task_summaries: Vec<TaskOutcomeSummary>,
}

impl ResultAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one task's terminal outcome, deduplicating any artifacts it produced.
    pub fn record_task(
        &mut self,
        task_id: TaskId,
        final_state: TaskState,
        attempts: u32,
        elapsed_ms: u64,
        quality_score: Option<f64>,
        findings: Vec<ValidationFinding>,
        required: bool,
        artifacts: Vec<Artifact>,
        consumed: Vec<ArtifactId>,
    ) {
        for artifact in artifacts {
            self.record_artifact(artifact, &consumed);
        }
        self.task_summaries.push(TaskOutcomeSummary {
            task_id,
            final_state,
            attempts,
            elapsed_ms,
            quality_score,
            findings,
            required,
        });
    }

    fn record_artifact(&mut self, artifact: Artifact, consumed: &[ArtifactId]) {
        if let Some(canonical_id) = self.canonical_by_hash.get(&artifact.content_hash) {
            if *canonical_id != artifact.id {
                self.artifact_refs.push(ArtifactRef {
                    id: artifact.id,
                    producer: artifact.producer,
                    canonical_id: canonical_id.clone(),
                });
            }
            return;
        }
        self.canonical_by_hash.insert(artifact.content_hash.clone(), artifact.id.clone());
        self.lineage.push(LineageRecord {
            artifact: artifact.id.clone(),
            producer: artifact.producer.clone(),
            consumed: consumed.to_vec(),
        });
        self.canonical_artifacts.push(artifact);
    }

    /// Consumes the aggregator, computing the overall Run status from every
    /// recorded task summary.
    #[must_use]
    pub fn finish(self) -> AggregationResult {
        let status = overall_status(&self.task_summaries);
        AggregationResult {
            artifacts: self.canonical_artifacts,
            artifact_refs: self.artifact_refs,
            lineage: self.lineage,
            task_summaries: self.task_summaries,
            status,
        }
    }
}

fn overall_status(summaries: &[TaskOutcomeSummary]) -> RunStatus {
    if summaries.is_empty() {
        return RunStatus::Pending;
    }
    if !summaries.iter().all(|s| s.final_state.is_terminal()) {
        return RunStatus::Running;
    }
    let any_required_failed = summaries
        .iter()
        .any(|s| s.required && matches!(s.final_state, TaskState::Failed));
    if any_required_failed {
        return RunStatus::Failed;
    }
    let all_succeeded = summaries
        .iter()
        .all(|s| matches!(s.final_state, TaskState::Validated | TaskState::Reported));
    if all_succeeded {
        return RunStatus::Succeeded;
    }
    let any_failed = summaries.iter().any(|s| matches!(s.final_state, TaskState::Failed));
    if any_failed { RunStatus::Failed } else { RunStatus::Partial }
}

/// Returns the set of artifact identifiers available when `task_id` runs:
/// every artifact produced by an ancestor in the dependency graph.
#[must_use]
pub fn available_artifact_ids(
    producer_artifacts: &BTreeMap<TaskId, Vec<ArtifactId>>,
    ancestors: &BTreeSet<TaskId>,
) -> BTreeSet<ArtifactId> {
    ancestors
        .iter()
        .filter_map(|task_id| producer_artifacts.get(task_id))
        .flat_map(|ids| ids.iter().cloned())
        .collect()
}
