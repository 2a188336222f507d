// crates/conduit-engine/src/run.rs
// ============================================================================
// Module: Orchestration Engine
// Description: The façade wiring extraction, the graph, the Phase Manager,
//              and result aggregation into one awaitable call.
// Purpose: Give callers one `run` entry point instead of wiring every stage
//          (Task Extractor -> Dependency Graph -> Phase Manager -> Resource
//          Allocator -> Agent Invoker -> Gate Runner -> Result Aggregator ->
//          Plan Updater) by hand for every Run.
// Dependencies: conduit-core, conduit-contract, conduit-transport, tokio
// ============================================================================

//! ## Overview
//! [`OrchestrationEngine`] owns the long-lived collaborators a Run needs
//! (the capability [`SchemaRegistry`] and the [`InProcessRegistry`]) and
//! takes the per-Run inputs — a [`PlanDocument`] and a [`RunConfig`] — as
//! arguments to [`OrchestrationEngine::run`]. Resource class limits and gate
//! weights are configured once on the engine, since they describe the
//! deployment rather than any one Run; translating a caller's full
//! configuration format into these pieces is left to the caller.
//!
//! [`OrchestrationEngine::run`] returns a [`RunHandle`] alongside the Run's
//! future rather than just awaiting it to completion: the handle lets a
//! caller cancel a Run that has already started, from outside the task
//! polling that future, by flipping the same `watch` signal the Phase
//! Manager threads through every in-flight invocation.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use conduit_contract::SchemaRegistry;
use conduit_core::ids::TaskId;
use conduit_core::Capability;
use conduit_core::RunConfig;
use conduit_core::StatusSink;
use conduit_transport::InProcessRegistry;
use tokio::sync::watch;

use crate::aggregator::AggregationResult;
use crate::decision::RollbackHandler;
use crate::error::OrchestrationError;
use crate::extractor::PlanDocument;
use crate::extractor::TaskExtractor;
use crate::gate::GateWeights;
use crate::phase_manager::PhaseManager;
use crate::plan_updater::PlanUpdater;
use crate::resource::ResourceAllocator;

/// A live handle to one [`OrchestrationEngine::run`] invocation, letting a
/// caller cancel it from outside the task awaiting its future.
///
/// # Invariants
/// - Cancellation is level-triggered and idempotent: calling [`RunHandle::cancel`]
///   more than once, or after the Run has already finished, has no further effect.
pub struct RunHandle {
    cancel_tx: watch::Sender<bool>,
}

impl RunHandle {
    /// Signals cancellation. Every in-flight attempt observes it on its next
    /// interrupt check and transitions to `Cancelled`; no not-yet-started
    /// task enters `Running` afterward.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// True once [`RunHandle::cancel`] has been called for this Run.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }
}

/// The result of one completed (or halted) Run.
pub struct RunResult {
    /// Deduplicated artifacts, lineage, and per-task summaries.
    pub aggregation: AggregationResult,
    /// Per-task terminal outcomes, addressed by identifier.
    pub plan: PlanUpdater,
    /// True iff a required task's failure halted the Run before every task finished.
    pub halted: bool,
}

/// Wires `Task Extractor -> Dependency Graph -> Phase Manager -> Resource
/// Allocator -> Agent Invoker -> Gate Runner -> Result Aggregator -> Plan
/// Updater` into one call.
pub struct OrchestrationEngine {
    registry: Arc<SchemaRegistry>,
    in_process: Arc<InProcessRegistry>,
    gate_weights: GateWeights,
    resource_class_limits: BTreeMap<String, u32>,
    sinks: Vec<Arc<dyn StatusSink>>,
    rollback_handler: Option<Arc<dyn RollbackHandler>>,
}

impl OrchestrationEngine {
    /// Builds an engine bound to a capability registry and an in-process
    /// handler table, both shared across every Run the engine drives.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>, in_process: Arc<InProcessRegistry>) -> Self {
        Self {
            registry,
            in_process,
            gate_weights: GateWeights::new(),
            resource_class_limits: BTreeMap::new(),
            sinks: Vec::new(),
            rollback_handler: None,
        }
    }

    /// Overrides the Gate Runner's per-gate score weights for every Run this
    /// engine drives.
    #[must_use]
    pub fn with_gate_weights(mut self, weights: GateWeights) -> Self {
        self.gate_weights = weights;
        self
    }

    /// Sets per-resource-class concurrency limits consulted under
    /// [`conduit_core::ParallelStrategy::ByResource`].
    #[must_use]
    pub fn with_resource_class_limits(mut self, limits: BTreeMap<String, u32>) -> Self {
        self.resource_class_limits = limits;
        self
    }

    /// Subscribes a status observer to every Run this engine drives.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Registers the handler consulted when the Decision Engine selects `ROLLBACK`.
    #[must_use]
    pub fn with_rollback_handler(mut self, handler: Arc<dyn RollbackHandler>) -> Self {
        self.rollback_handler = Some(handler);
        self
    }

    /// Extracts `plan` into a Task set and Dependency Graph, then returns a
    /// [`RunHandle`] alongside a future that runs it to completion under
    /// `config`. The handle can cancel the Run at any point before its
    /// future resolves; dropping the handle without calling
    /// [`RunHandle::cancel`] lets the Run finish normally.
    ///
    /// # Errors
    ///
    /// The returned future resolves to [`OrchestrationError::Extraction`]
    /// when `plan` is malformed or names an unknown capability or
    /// dependency, [`OrchestrationError::Graph`] when the derived edge set
    /// is cyclic, or [`OrchestrationError::Registry`] when a task's bound
    /// capability cannot be looked up after extraction succeeded (a
    /// caller-registry race, not a plan defect).
    pub fn run<'a>(
        &'a self,
        plan: &'a PlanDocument,
        config: &'a RunConfig,
    ) -> (RunHandle, impl Future<Output = Result<RunResult, OrchestrationError>> + 'a) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = RunHandle { cancel_tx: cancel_tx.clone() };

        let future = async move {
            let (tasks, graph) = TaskExtractor::new().extract(plan, &self.registry)?;
            let declared_tests = plan.declared_tests();

            let mut capabilities: BTreeMap<TaskId, Capability> = BTreeMap::new();
            for task in &tasks {
                let capability = self.registry.get(&task.capability_id)?.clone();
                capabilities.insert(task.id.clone(), capability);
            }

            let allocator = Arc::new(ResourceAllocator::new(
                config.parallel_strategy,
                config.global_concurrency,
                self.resource_class_limits.clone(),
            ));

            let mut manager = PhaseManager::new(
                graph,
                tasks,
                capabilities,
                declared_tests,
                Arc::clone(&self.registry),
                Arc::clone(&self.in_process),
                allocator,
                self.gate_weights.clone(),
                config.failure_strategy,
                cancel_tx,
                cancel_rx,
            );
            for sink in &self.sinks {
                manager = manager.with_sink(Arc::clone(sink));
            }
            if let Some(handler) = &self.rollback_handler {
                manager = manager.with_rollback_handler(Arc::clone(handler));
            }

            let outcome = manager.run(config.input.clone()).await;
            Ok(RunResult { aggregation: outcome.aggregation, plan: outcome.plan, halted: outcome.halted })
        };

        (handle, future)
    }
}
