// conduit-system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared capability/plan builders and in-process handlers used
//              across the end-to-end scenario and invariant suites.
// Purpose: Let every suite exercise the same public OrchestrationEngine
//          surface without re-deriving capability/plan boilerplate.
// Dependencies: conduit-core, conduit-engine, conduit-transport, tokio
// ============================================================================

#![allow(dead_code, reason = "not every helper is used by every suite binary")]

use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use conduit_core::ids::CapabilityId;
use conduit_core::Capability;
use conduit_core::RetryPolicy;
use conduit_core::SinkError;
use conduit_core::StatusEvent;
use conduit_core::StatusSink;
use conduit_core::Transport;
use conduit_engine::extractor::PlanDocument;
use conduit_engine::extractor::WorkItem;
use conduit_transport::InProcessHandler;
use conduit_transport::InProcessRegistry;
use conduit_transport::InvokeError;
use serde_json::json;
use serde_json::Value;

/// A capability bound to the in-process `echo` handler, returning its
/// resolved input verbatim under an `echoed` field.
#[must_use]
pub fn echo_capability(id: &str) -> Capability {
    Capability {
        id: CapabilityId::new(id),
        input_schema: json!({}),
        output_schema: json!({}),
        transport: Transport::InProcess { handler_id: id.to_string() },
        max_concurrency: 4,
        default_timeout_ms: 5_000,
        retry_policy: RetryPolicy::none(),
        complexity_weight: 1.0,
        resource_class: None,
    }
}

/// A capability identical to [`echo_capability`] but with a non-zero retry
/// budget and a short, test-friendly backoff.
#[must_use]
pub fn flaky_capability(id: &str) -> Capability {
    Capability {
        retry_policy: RetryPolicy { max_retries: 5, base_ms: 1, factor: 1.0, jitter: 0.0, cap_ms: 5 },
        ..echo_capability(id)
    }
}

/// A capability bound to the `sleep` executable over the stdio transport,
/// used to exercise mid-flight cancellation of an out-of-process attempt.
#[must_use]
pub fn stdio_sleep_capability(id: &str, seconds: u64) -> Capability {
    Capability {
        transport: Transport::Stdio {
            command: "sleep".to_string(),
            args: vec![seconds.to_string()],
            cwd: None,
            pool_size: 1,
        },
        default_timeout_ms: 30_000,
        ..echo_capability(id)
    }
}

/// A work item bound to `capability_id`, depending on `depends_on`, with no
/// retry budget or deadline override.
#[must_use]
pub fn work_item(id: &str, capability_id: &str, input: Value, depends_on: &[&str]) -> WorkItem {
    WorkItem {
        id: id.to_string(),
        capability_id: capability_id.to_string(),
        input,
        depends_on: depends_on.iter().map(|dep| (*dep).to_string()).collect(),
        priority: 0,
        retry_budget: None,
        deadline_ms: None,
        required: false,
        tests: vec![],
    }
}

/// A [`work_item`] with an explicit retry budget and the `required` flag set,
/// used by scenarios that exercise the retry path or a halting failure.
#[must_use]
pub fn critical_work_item(id: &str, capability_id: &str, input: Value, retry_budget: u32) -> WorkItem {
    WorkItem { retry_budget: Some(retry_budget), required: true, ..work_item(id, capability_id, input, &[]) }
}

/// Builds a [`PlanDocument`] from a list of work items.
#[must_use]
pub fn plan(items: Vec<WorkItem>) -> PlanDocument {
    PlanDocument { items }
}

/// Echoes its resolved input back under an `echoed` field, letting
/// downstream tasks reference `$steps.<id>.output.echoed`.
pub struct EchoHandler;

#[async_trait::async_trait]
impl InProcessHandler for EchoHandler {
    async fn call(&self, input: Value) -> Result<Value, InvokeError> {
        Ok(json!({"ok": true, "echoed": input}))
    }
}

/// Fails with a retryable transport error on its first `failures_before_success`
/// calls, then echoes its input.
pub struct FlakyHandler {
    attempts: AtomicU32,
    failures_before_success: u32,
}

impl FlakyHandler {
    /// Builds a handler that fails `failures_before_success` times before succeeding.
    #[must_use]
    pub fn new(failures_before_success: u32) -> Self {
        Self { attempts: AtomicU32::new(0), failures_before_success }
    }

    /// Total number of calls made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InProcessHandler for FlakyHandler {
    async fn call(&self, input: Value) -> Result<Value, InvokeError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures_before_success {
            return Err(InvokeError::Transport("simulated transient failure".to_string()));
        }
        Ok(json!({"ok": true, "echoed": input}))
    }
}

/// A handler returning a fixed output, ignoring its input. Useful for
/// triggering a specific gate outcome (e.g. an embedded secret pattern).
pub struct FixedOutputHandler(pub Value);

#[async_trait::async_trait]
impl InProcessHandler for FixedOutputHandler {
    async fn call(&self, _input: Value) -> Result<Value, InvokeError> {
        Ok(self.0.clone())
    }
}

/// Builds an in-process registry with one handler per `(id, handler)` pair.
#[must_use]
pub fn registry_with_handlers(handlers: Vec<(&str, Arc<dyn InProcessHandler>)>) -> InProcessRegistry {
    let mut registry = InProcessRegistry::new();
    for (id, handler) in handlers {
        registry.register(id, handler);
    }
    registry
}

/// Collects every [`StatusEvent`] observed during a Run, for assertions on
/// the transition sequence a black-box result summary cannot express.
#[derive(Default, Clone)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<StatusEvent>>>,
}

impl CollectingSink {
    /// Builds an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every event observed so far, in observation order.
    #[must_use]
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

impl StatusSink for CollectingSink {
    fn observe(&self, event: &StatusEvent) -> Result<(), SinkError> {
        self.events.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(event.clone());
        Ok(())
    }
}
