// crates/conduit-core/src/errors.rs
// ============================================================================
// Module: Error Taxonomy
// Description: The closed set of error categories and the fatal/per-task error types.
// Purpose: Give every crate in the workspace one stable vocabulary for classifying
//          failures, so the Decision Engine can dispatch on category alone.
// Dependencies: thiserror, crate::ids
// ============================================================================

//! ## Overview
//! The taxonomy is closed by design: `ErrorCategory` is an enum, not a string,
//! so adding a new failure class is a compile-time decision reviewed across
//! every `match` that dispatches on it (the Agent Invoker's retry decision,
//! the Decision Engine's default rule table, the Run's final-error synthesis).

use std::fmt;

use crate::ids::GateId;
use crate::ids::TaskId;

/// The closed set of error categories from the error handling design.
///
/// # Invariants
/// - Stable identifiers; `as_str` values are part of the external error contract (§6.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The plan structure itself could not be parsed.
    SpecParseError,
    /// A task named a capability the Schema Registry does not know.
    SchemaUnknown,
    /// The dependency graph contains a cycle.
    CycleDetected,
    /// A `$input.*` or `$steps.*` reference could not be resolved.
    ReferenceUnresolved,
    /// The substituted input failed schema validation.
    InputValidationError,
    /// The worker's output failed schema validation.
    OutputValidationError,
    /// A transport-level I/O failure.
    TransportError,
    /// The per-attempt deadline elapsed.
    Timeout,
    /// The attempt was cooperatively cancelled.
    Cancelled,
    /// The worker reported a permanent error.
    WorkerPermanent,
    /// The worker reported a transient error.
    WorkerTransient,
    /// A gate in the chain emitted a critical finding.
    GateFailed(GateId),
    /// The resource allocator could not grant a slot; the task stays `READY`.
    ResourceExhausted,
    /// An unclassified failure; always logged with full context.
    InternalError,
}

impl ErrorCategory {
    /// Returns the stable external identifier for this category, e.g. `gate_failed:security`.
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            Self::SpecParseError => "spec_parse_error".to_string(),
            Self::SchemaUnknown => "schema_unknown".to_string(),
            Self::CycleDetected => "cycle_detected".to_string(),
            Self::ReferenceUnresolved => "reference_unresolved".to_string(),
            Self::InputValidationError => "input_validation_error".to_string(),
            Self::OutputValidationError => "output_validation_error".to_string(),
            Self::TransportError => "transport_error".to_string(),
            Self::Timeout => "timeout".to_string(),
            Self::Cancelled => "cancelled".to_string(),
            Self::WorkerPermanent => "worker_permanent".to_string(),
            Self::WorkerTransient => "worker_transient".to_string(),
            Self::GateFailed(gate) => format!("gate_failed:{gate}"),
            Self::ResourceExhausted => "resource_exhausted".to_string(),
            Self::InternalError => "internal_error".to_string(),
        }
    }

    /// Returns true when the Agent Invoker should retry an error in this category,
    /// per §4.5's retryable/non-retryable classification.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportError | Self::Timeout | Self::WorkerTransient)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// A fatal, Run-aborting error raised by the Task Extractor.
///
/// # Invariants
/// - Raised before any task enters `RUNNING`; the Run never executes partially
///   extracted state.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The plan document itself failed to parse into work items.
    #[error("failed to parse plan: {0}")]
    SpecParse(String),
    /// A work item named a capability the Schema Registry does not know.
    #[error("unknown capability `{capability_id}` referenced by task `{task_id}`")]
    UnknownCapability {
        /// Task that referenced the capability.
        task_id: TaskId,
        /// Capability identifier that could not be resolved.
        capability_id: String,
    },
    /// A reference could not be resolved against the input bag or a prior step.
    #[error("unresolved reference `{reference}` in task `{task_id}`")]
    UnresolvedReference {
        /// Task whose input contained the reference.
        task_id: TaskId,
        /// The raw reference string, e.g. `$steps.missing.output.x`.
        reference: String,
    },
    /// A declared dependency named a task that does not exist in the plan.
    #[error("task `{task_id}` depends on unknown task `{dependency_id}`")]
    UnknownDependency {
        /// Task that declared the dependency.
        task_id: TaskId,
        /// Dependency identifier that does not exist.
        dependency_id: String,
    },
    /// The union of dependency edges contains a cycle.
    #[error("dependency cycle detected: {}", cycle.iter().map(TaskId::as_str).collect::<Vec<_>>().join(" -> "))]
    CycleDetected {
        /// The shortest cycle found, in traversal order.
        cycle: Vec<TaskId>,
    },
}

impl ExtractionError {
    /// Maps this error onto the closed [`ErrorCategory`] taxonomy.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::SpecParse(_) => ErrorCategory::SpecParseError,
            Self::UnknownCapability { .. } => ErrorCategory::SchemaUnknown,
            Self::UnresolvedReference { .. } | Self::UnknownDependency { .. } => {
                ErrorCategory::ReferenceUnresolved
            }
            Self::CycleDetected { .. } => ErrorCategory::CycleDetected,
        }
    }
}

/// A per-task error surfaced from invocation, validation, or gating.
#[derive(Debug, thiserror::Error)]
#[error("task `{task_id}` failed: {category}")]
pub struct TaskError {
    /// Task the error applies to.
    pub task_id: TaskId,
    /// Closed-taxonomy category for this error.
    pub category: ErrorCategory,
    /// Human-readable detail message.
    pub message: String,
}

impl TaskError {
    /// Builds a new task error.
    #[must_use]
    pub fn new(task_id: TaskId, category: ErrorCategory, message: impl Into<String>) -> Self {
        Self { task_id, category, message: message.into() }
    }
}
