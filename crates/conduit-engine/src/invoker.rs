// crates/conduit-engine/src/invoker.rs
// ============================================================================
// Module: Agent Invoker
// Description: Resolves a task's input, validates it, dispatches to a worker,
//              and retries retryable failures with exponential backoff.
// Purpose: Give the Phase Manager one `invoke` call per task attempt cycle
//          that hides reference resolution, schema validation, transport
//          dispatch, and retry policy behind a single outcome type.
// Dependencies: conduit-core, conduit-contract, conduit-transport, tokio
// ============================================================================

//! ## Overview
//! One call to [`AgentInvoker::invoke`] covers every attempt of a single
//! task: it substitutes references, validates the resolved input, dispatches
//! over the capability's transport, and on a retryable [`conduit_transport::InvokeError`]
//! sleeps for [`conduit_core::RetryPolicy::delay_ms`] before trying again, up
//! to the capability's (or task's) retry budget. The caller only sees the
//! final [`InvocationOutcome`] or [`TaskError`] and the number of attempts made.

use std::collections::BTreeMap;
use std::time::Duration;

use conduit_contract::SchemaRegistry;
use conduit_core::artifact::Artifact;
use conduit_core::ids::TaskId;
use conduit_core::reference::Reference;
use conduit_core::reference::get_path;
use conduit_core::reference::substitute;
use conduit_core::Capability;
use conduit_core::ErrorCategory;
use conduit_core::Task;
use conduit_core::TaskError;
use conduit_core::ValidationFinding;
use conduit_transport::InProcessRegistry;
use conduit_transport::InvocationContext;
use conduit_transport::InvokeError;
use serde_json::Value;
use tokio::sync::watch;

/// The result of one fully-resolved, fully-retried task invocation.
#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    /// Whether the worker reported success.
    pub ok: bool,
    /// The worker's raw output value.
    pub value: Value,
    /// Artifacts the worker declared in its output, if any.
    pub artifacts: Vec<Artifact>,
    /// Findings the worker self-reported, distinct from Gate Runner findings.
    pub findings: Vec<ValidationFinding>,
    /// Total wall-clock time across every attempt.
    pub elapsed_ms: u64,
    /// Number of attempts made, including the first.
    pub attempts: u32,
}

/// Resolves, validates, dispatches, and retries one task's invocation.
pub struct AgentInvoker<'a> {
    registry: &'a SchemaRegistry,
    in_process: &'a InProcessRegistry,
}

impl<'a> AgentInvoker<'a> {
    /// Builds an invoker bound to a schema registry and in-process handler table.
    #[must_use]
    pub fn new(registry: &'a SchemaRegistry, in_process: &'a InProcessRegistry) -> Self {
        Self { registry, in_process }
    }

    /// Invokes `task` against `capability`, resolving references against
    /// `run_input` and `step_outputs`, retrying retryable failures per
    /// `capability.retry_policy` up to `retry_budget` additional attempts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] with [`ErrorCategory::ReferenceUnresolved`] when
    /// a reference cannot be resolved, [`ErrorCategory::InputValidationError`]
    /// when the resolved input fails the capability's input schema, or the
    /// classified category of the final transport failure once the retry
    /// budget is exhausted.
    pub async fn invoke(
        &self,
        task: &Task,
        capability: &Capability,
        run_input: &Value,
        step_outputs: &BTreeMap<TaskId, Value>,
        retry_budget: u32,
        cancel: watch::Receiver<bool>,
    ) -> Result<InvocationOutcome, TaskError> {
        let resolved = substitute(&task.input_template, &|reference| {
            resolve_reference(reference, run_input, step_outputs)
        })
        .map_err(|unresolved| {
            TaskError::new(
                task.id.clone(),
                ErrorCategory::ReferenceUnresolved,
                format!("unresolved references: {}", unresolved.join(", ")),
            )
        })?;

        let validation_errors = self
            .registry
            .validate_input(&capability.id, &resolved)
            .map_err(|err| TaskError::new(task.id.clone(), ErrorCategory::InternalError, err.to_string()))?;
        if !validation_errors.is_empty() {
            return Err(TaskError::new(
                task.id.clone(),
                ErrorCategory::InputValidationError,
                validation_errors.join("; "),
            ));
        }

        let timeout_ms = task.deadline_ms.unwrap_or(capability.default_timeout_ms);
        let mut attempts = 0u32;
        let mut elapsed_ms = 0u64;

        loop {
            attempts += 1;
            let ctx = InvocationContext::new(Duration::from_millis(timeout_ms), cancel.clone());
            let started = elapsed_ms;
            match conduit_transport::dispatch(&capability.transport, self.in_process, resolved.clone(), &ctx).await {
                Ok(value) => {
                    elapsed_ms = started.saturating_add(timeout_ms.saturating_sub(duration_ms(ctx.remaining())));
                    return Ok(parse_outcome(value, elapsed_ms, attempts));
                }
                Err(invoke_error) => {
                    let category = classify(&invoke_error);
                    elapsed_ms = started.saturating_add(timeout_ms);
                    let exhausted = attempts > retry_budget;
                    if !category.is_retryable() || exhausted {
                        return Err(TaskError::new(task.id.clone(), category, invoke_error.to_string()));
                    }
                    let delay = capability.retry_policy.delay_ms(attempts);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn resolve_reference(
    reference: &Reference,
    run_input: &Value,
    step_outputs: &BTreeMap<TaskId, Value>,
) -> Option<Value> {
    match reference {
        Reference::Input { path } => get_path(run_input, path).cloned(),
        Reference::Step { task_id, path } => {
            let output = step_outputs.get(task_id)?;
            if path.is_empty() {
                Some(output.clone())
            } else {
                get_path(output, path).cloned()
            }
        }
    }
}

fn classify(error: &InvokeError) -> ErrorCategory {
    match error {
        InvokeError::Timeout { .. } => ErrorCategory::Timeout,
        InvokeError::Cancelled => ErrorCategory::Cancelled,
        InvokeError::UnknownHandler(_) => ErrorCategory::InternalError,
        InvokeError::Transport(_) => ErrorCategory::TransportError,
        InvokeError::MalformedResponse(_) => ErrorCategory::WorkerPermanent,
    }
}

fn parse_outcome(value: Value, elapsed_ms: u64, attempts: u32) -> InvocationOutcome {
    let ok = value.get("ok").and_then(Value::as_bool).unwrap_or(true);
    let artifacts = value
        .get("artifacts")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<Artifact>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    let findings = value
        .get("findings")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<ValidationFinding>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    InvocationOutcome { ok, value, artifacts, findings, elapsed_ms, attempts }
}
