// crates/conduit-core/src/run.rs
// ============================================================================
// Module: Run Configuration & Status
// Description: Run-wide configuration and the overall status computation inputs.
// Purpose: Carry the strategy selections and input bag a Run needs before the
//          Phase Manager starts, and the status values it can end in.
// Dependencies: serde, serde_json
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ids::RunId;

/// Selectable parallel-blocking strategy for same-level tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParallelStrategy {
    /// Release every ready task, bounded only by global concurrency.
    Max,
    /// Limit each resource class to its declared slot count.
    ByResource,
    /// One task per capability identifier at a time.
    ByCapability,
    /// One task per phase regardless of width.
    Conservative,
}

impl Default for ParallelStrategy {
    fn default() -> Self {
        Self::Max
    }
}

/// Selectable failure strategy when a task's retry budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Mark transitive dependents `SKIPPED` with reason `predecessor_failed`.
    Continue,
    /// Cancel every not-yet-started task.
    Halt,
    /// Unwind artifacts of completed tasks in LIFO order via a rollback handler.
    Rollback,
}

impl Default for FailureStrategy {
    fn default() -> Self {
        Self::Continue
    }
}

/// Run-wide configuration supplied at Run start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Identifier for this Run.
    pub run_id: RunId,
    /// Run-wide input value addressable by `$input.*`.
    pub input: Value,
    /// Strategy for releasing same-level tasks.
    #[serde(default)]
    pub parallel_strategy: ParallelStrategy,
    /// Strategy applied when a task exhausts its retry budget.
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    /// Global concurrency ceiling across all capabilities.
    pub global_concurrency: u32,
}

/// Overall status of a Run, computed per §4.7 from terminal task states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The Run has not yet started executing tasks.
    Pending,
    /// The Run has at least one non-terminal task.
    Running,
    /// Every task is `Validated`/`Reported`.
    Succeeded,
    /// At least one non-skippable task is `Failed`.
    Failed,
    /// Neither fully succeeded nor unambiguously failed (e.g. a cancellation
    /// left tasks cancelled without any outright failure).
    Partial,
}
