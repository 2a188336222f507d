// crates/conduit-core/src/task.rs
// ============================================================================
// Module: Task & State Machine
// Description: The Task entity, dependency edges, and the fixed per-task state machine.
// Purpose: Give the Phase Manager and State Machine a single source of truth for
//          what a Task is and which transitions are legal.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! `TaskState::can_transition_to` is the whole state machine: a pure function
//! over the fixed transition table. Nothing else in the codebase is allowed
//! to move a Task between states without going through it, so adding an
//! illegal edge anywhere is a compile-reachable, test-catchable mistake
//! rather than a runtime surprise.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ids::CapabilityId;
use crate::ids::PhaseNumber;
use crate::ids::TaskId;

/// Lifecycle state of one Task.
///
/// # Invariants
/// - Terminal states are `Validated`, `Reported`, `Failed`, `Skipped`, `Cancelled`.
/// - Every transition between two states must be present in [`TaskState::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Extracted but not yet scheduled.
    Pending,
    /// Extractor has finished; waiting for dependencies to become terminal.
    Scheduled,
    /// All dependencies are terminal; waiting for a resource grant.
    Ready,
    /// An attempt is in flight.
    Running,
    /// The worker returned; gates have not yet run.
    Succeeded,
    /// The worker errored, timed out, or its output was rejected.
    Failed,
    /// Budget remains and the error was retryable; waiting for backoff to elapse.
    Retrying,
    /// Budget was exhausted under the `CONTINUE` failure strategy.
    Skipped,
    /// The Run was aborted or the attempt was cooperatively cancelled.
    Cancelled,
    /// Every gate in the chain passed with no critical finding.
    Validated,
    /// The Plan Updater has written this outcome back into the spec.
    Reported,
}

impl TaskState {
    /// Returns true when no further transition is possible from this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Validated | Self::Reported | Self::Failed | Self::Skipped | Self::Cancelled
        )
    }

    /// Returns true when `self -> next` is one of the fixed transitions.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Scheduled)
                | (Self::Scheduled, Self::Ready)
                | (Self::Scheduled, Self::Cancelled)
                | (Self::Ready, Self::Running)
                | (Self::Ready, Self::Cancelled)
                | (Self::Running, Self::Succeeded)
                | (Self::Running, Self::Failed)
                | (Self::Running, Self::Cancelled)
                | (Self::Failed, Self::Retrying)
                | (Self::Failed, Self::Skipped)
                | (Self::Retrying, Self::Running)
                | (Self::Succeeded, Self::Validated)
                | (Self::Succeeded, Self::Failed)
                | (Self::Validated, Self::Reported)
        )
    }
}

/// Whether a dependency edge carries data or only enforces ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// The consumer reads a value produced by the producer.
    Data,
    /// The consumer must wait for the producer but reads nothing from it.
    Ordering,
}

/// A directed edge `producer -> consumer` in the Dependency Graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Task whose output (or mere completion) is depended upon.
    pub producer: TaskId,
    /// Task that depends on `producer`.
    pub consumer: TaskId,
    /// Whether the consumer reads the producer's output.
    pub kind: EdgeKind,
}

/// One unit of work bound to a Capability.
///
/// # Invariants
/// - `id` is unique within the owning Run.
/// - `dependencies` is exactly the set of `producer` identifiers from edges whose
///   `consumer` is this task; the Dependency Graph and the Task's own field must agree.
/// - Created by the Task Extractor; mutated only by the State Machine and the Agent
///   Invoker (for `last_output`/`attempt`/`state`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier within the Run.
    pub id: TaskId,
    /// Capability this task invokes.
    pub capability_id: CapabilityId,
    /// Bound input value, with references already resolved to edges but not yet substituted.
    pub input_template: Value,
    /// Identifiers of tasks this task depends on (data or ordering).
    pub dependencies: Vec<TaskId>,
    /// Phase number assigned by the Dependency Graph's level assignment.
    pub phase: PhaseNumber,
    /// Scheduling priority; higher runs first among otherwise-ready tasks.
    pub priority: i32,
    /// Number of attempts made so far (0 before the first attempt).
    pub attempt: u32,
    /// Maximum number of retries allowed beyond the first attempt.
    pub retry_budget: u32,
    /// Optional task-wide deadline in milliseconds from Run start, covering all attempts.
    pub deadline_ms: Option<u64>,
    /// When true, a gate-critical failure escalates to `HALT` instead of `CONTINUE`.
    pub required: bool,
    /// Current lifecycle state.
    pub state: TaskState,
    /// Complexity score computed by the Task Extractor; informs scheduling heuristics only.
    pub complexity_score: f64,
}

impl Task {
    /// Attempts the transition to `next`, returning the new state on success.
    ///
    /// # Errors
    ///
    /// Returns the rejected `(from, to)` pair when the transition is not in the
    /// fixed table.
    pub fn transition(&mut self, next: TaskState) -> Result<TaskState, (TaskState, TaskState)> {
        if self.state.can_transition_to(next) {
            self.state = next;
            Ok(next)
        } else {
            Err((self.state, next))
        }
    }
}
