// crates/conduit-engine/src/phase_manager.rs
// ============================================================================
// Module: Phase Manager
// Description: Drives a Run's tasks through the state machine, phase by phase.
// Purpose: Own the ready set and every scheduling decision so the rest of the
//          engine's stages stay simple, synchronous functions called from here.
// Dependencies: conduit-core, conduit-contract, conduit-transport, conduit-status,
//               tokio
// ============================================================================

//! ## Overview
//! One [`PhaseManager`] owns a Run end to end: it is single-threaded in the
//! sense that only it ever decides what runs next or calls [`Task::transition`];
//! the work it dispatches runs off that thread as async task attempts
//! collected in a [`tokio::task::JoinSet`]. A task becomes ready the moment its
//! in-degree (remaining non-terminal predecessors) reaches zero, which is
//! exactly the Phase Manager's own definition of a phase boundary — so ready-set
//! maintenance and phase advancement are the same bookkeeping, not two.
//!
//! On a required task's unrecoverable failure the Decision Engine's `HALT`
//! cancels every task that has not yet started and lets in-flight attempts
//! finish; the fixed state machine only names `FAILED -> SKIPPED`, so a
//! cascade onto not-yet-run transitive dependents is applied by setting
//! their state directly rather than through [`Task::transition`], since it is
//! a graph-wide propagation effect, not a single task's own lifecycle edge.
//!
//! An external caller cancelling the Run (through the `watch` sender handed
//! back alongside the Run's future) is observed on the same `cancel_rx` every
//! in-flight invocation already polls, and is folded into the main loop as
//! just another way `halted` becomes true — a cancelled attempt surfaces as
//! an [`ErrorCategory::Cancelled`] failure and transitions straight to
//! `CANCELLED` rather than going through the Decision Engine, since there is
//! nothing left to decide.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use conduit_contract::SchemaRegistry;
use conduit_core::ids::ArtifactId;
use conduit_core::ids::TaskId;
use conduit_core::Capability;
use conduit_core::ErrorCategory;
use conduit_core::FailureStrategy;
use conduit_core::StatusEvent;
use conduit_core::StatusSink;
use conduit_core::Task;
use conduit_core::TaskError;
use conduit_core::TaskState;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::aggregator::ResultAggregator;
use crate::decision::DecisionAction;
use crate::decision::DecisionContext;
use crate::decision::DecisionEngine;
use crate::decision::RollbackHandler;
use crate::gate::testing::TestCase;
use crate::gate::GateContext;
use crate::gate::GateRunner;
use crate::gate::GateWeights;
use crate::invoker::AgentInvoker;
use crate::invoker::InvocationOutcome;
use crate::plan_updater::FindingsSummary;
use crate::plan_updater::PlanTaskOutcome;
use crate::plan_updater::PlanUpdater;
use conduit_transport::InProcessRegistry;

use crate::graph::DependencyGraph;
use crate::resource::ResourceAllocator;

/// Everything the Phase Manager needs to run one Run to completion.
pub struct PhaseManager {
    graph: DependencyGraph,
    tasks: BTreeMap<TaskId, Task>,
    capabilities: BTreeMap<TaskId, Capability>,
    declared_tests: BTreeMap<TaskId, Vec<TestCase>>,
    registry: Arc<SchemaRegistry>,
    in_process: Arc<InProcessRegistry>,
    allocator: Arc<ResourceAllocator>,
    gate_runner: Arc<GateRunner>,
    gate_weights: GateWeights,
    failure_strategy: FailureStrategy,
    sinks: Vec<Arc<dyn StatusSink>>,
    rollback_handler: Option<Arc<dyn RollbackHandler>>,
    cancel_tx: watch::Sender<bool>,
    cancel_rx: watch::Receiver<bool>,
}

/// What one task attempt returned, tagged with the identity needed to react to it.
struct Completion {
    task_id: TaskId,
    result: Result<InvocationOutcome, TaskError>,
}

/// The outcome of a whole Run: an aggregated result plus whether it was halted.
pub struct PhaseManagerOutcome {
    /// Deduplicated artifacts, lineage, and per-task summaries.
    pub aggregation: crate::aggregator::AggregationResult,
    /// Per-task terminal outcomes, addressed by identifier.
    pub plan: PlanUpdater,
    /// True iff a required task's failure halted the Run before every task finished.
    pub halted: bool,
}

impl PhaseManager {
    /// Builds a Phase Manager for one Run over `tasks`/`graph`, binding each
    /// task's capability from `registry`. `cancel_tx`/`cancel_rx` are the two
    /// ends of the same `watch` channel: every in-flight invocation is handed
    /// a clone of `cancel_rx`, and a caller holding `cancel_tx` (or a clone of
    /// it) can cancel the whole Run from outside by sending `true`.
    #[must_use]
    #[allow(clippy::too_many_arguments, reason = "every field is a distinct collaborator the Phase Manager owns")]
    pub fn new(
        graph: DependencyGraph,
        tasks: Vec<Task>,
        capabilities: BTreeMap<TaskId, Capability>,
        declared_tests: BTreeMap<TaskId, Vec<TestCase>>,
        registry: Arc<SchemaRegistry>,
        in_process: Arc<InProcessRegistry>,
        allocator: Arc<ResourceAllocator>,
        gate_weights: GateWeights,
        failure_strategy: FailureStrategy,
        cancel_tx: watch::Sender<bool>,
        cancel_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            graph,
            tasks: tasks.into_iter().map(|task| (task.id.clone(), task)).collect(),
            capabilities,
            declared_tests,
            registry,
            in_process,
            allocator,
            gate_runner: Arc::new(GateRunner::new()),
            gate_weights,
            failure_strategy,
            sinks: Vec::new(),
            rollback_handler: None,
            cancel_tx,
            cancel_rx,
        }
    }

    /// Subscribes a status observer; every task transition, phase advance, and
    /// artifact publication is delivered to it.
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

    /// Runs every task in `self` to a terminal state, resolving `$input.*`
    /// references against `run_input`, validating output through the gate
    /// chain, and writing per-task outcomes back through a [`PlanUpdater`].
    pub async fn run(mut self, run_input: Value) -> PhaseManagerOutcome {
        let start = Instant::now();
        let mut step_outputs: BTreeMap<TaskId, Value> = BTreeMap::new();
        let mut producer_artifacts: BTreeMap<TaskId, Vec<ArtifactId>> = BTreeMap::new();
        let mut known_artifacts: BTreeSet<ArtifactId> = BTreeSet::new();
        let mut consecutive_timeouts: BTreeMap<TaskId, u32> = BTreeMap::new();
        let mut in_degree: BTreeMap<TaskId, usize> = self
            .graph
            .vertices()
            .iter()
            .map(|id| (id.clone(), self.graph.predecessors(id).len()))
            .collect();
        let mut aggregator = ResultAggregator::new();
        let mut plan_updater = PlanUpdater::new();
        let mut halted = false;
        let mut in_flight: JoinSet<Option<Completion>> = JoinSet::new();

        for id in self.graph.vertices().clone() {
            self.transition(&id, TaskState::Scheduled, None, start);
        }

        let mut ready: Vec<TaskId> =
            in_degree.iter().filter(|(_, degree)| **degree == 0).map(|(id, _)| id.clone()).collect();
        for id in &ready {
            self.transition(id, TaskState::Ready, None, start);
        }

        loop {
            if !halted && *self.cancel_rx.borrow() {
                halted = true;
            }

            if halted {
                let stuck: Vec<TaskId> = self
                    .tasks
                    .iter()
                    .filter(|(_, task)| matches!(task.state, TaskState::Scheduled | TaskState::Ready))
                    .map(|(id, _)| id.clone())
                    .collect();
                for id in stuck {
                    self.cancel_not_started(&id, &mut aggregator, &mut plan_updater, start);
                }
                ready.clear();
            } else {
                ready.sort_by(|a, b| {
                    let pa = self.tasks.get(a).map_or(0, |task| task.priority);
                    let pb = self.tasks.get(b).map_or(0, |task| task.priority);
                    pb.cmp(&pa)
                });
                for id in ready.drain(..) {
                    self.transition(&id, TaskState::Running, None, start);
                    self.spawn_invocation(
                        &id,
                        run_input.clone(),
                        step_outputs.clone(),
                        self.cancel_rx.clone(),
                        &mut in_flight,
                    );
                }
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };
            let completion = match joined {
                Ok(completion) => completion,
                Err(join_error) => continue_on_panic(join_error),
            };

            let Some(completion) = completion else {
                continue;
            };

            let cancel_tx = self.cancel_tx.clone();
            let newly_ready = self.handle_completion(
                completion,
                &mut step_outputs,
                &mut producer_artifacts,
                &mut known_artifacts,
                &mut consecutive_timeouts,
                &mut in_degree,
                &mut aggregator,
                &mut plan_updater,
                &mut halted,
                &cancel_tx,
                start,
            );
            ready.extend(newly_ready);
        }

        PhaseManagerOutcome { aggregation: aggregator.finish(), plan: plan_updater, halted }
    }

    fn spawn_invocation(
        &self,
        task_id: &TaskId,
        run_input: Value,
        step_outputs: BTreeMap<TaskId, Value>,
        cancel: watch::Receiver<bool>,
        in_flight: &mut JoinSet<Option<Completion>>,
    ) {
        let Some(task) = self.tasks.get(task_id).cloned() else { return };
        let Some(capability) = self.capabilities.get(task_id).cloned() else {
            in_flight.spawn(async move {
                Some(Completion {
                    task_id: task.id.clone(),
                    result: Err(TaskError::new(task.id, ErrorCategory::SchemaUnknown, "no bound capability")),
                })
            });
            return;
        };
        let registry = Arc::clone(&self.registry);
        let in_process = Arc::clone(&self.in_process);
        let allocator = Arc::clone(&self.allocator);

        in_flight.spawn(async move {
            let grant = match allocator.acquire(&capability).await {
                Ok(grant) => grant,
                Err(_) => {
                    return Some(Completion {
                        task_id: task.id.clone(),
                        result: Err(TaskError::new(
                            task.id,
                            ErrorCategory::ResourceExhausted,
                            "resource allocator closed",
                        )),
                    });
                }
            };
            let retry_budget = task.retry_budget.saturating_sub(task.attempt);
            let invoker = AgentInvoker::new(&registry, &in_process);
            let result = invoker.invoke(&task, &capability, &run_input, &step_outputs, retry_budget, cancel).await;
            drop(grant);
            Some(Completion { task_id: task.id.clone(), result })
        });
    }

    #[allow(clippy::too_many_arguments, reason = "threading every accumulator through is clearer than a god-struct")]
    fn handle_completion(
        &mut self,
        completion: Completion,
        step_outputs: &mut BTreeMap<TaskId, Value>,
        producer_artifacts: &mut BTreeMap<TaskId, Vec<ArtifactId>>,
        known_artifacts: &mut BTreeSet<ArtifactId>,
        consecutive_timeouts: &mut BTreeMap<TaskId, u32>,
        in_degree: &mut BTreeMap<TaskId, usize>,
        aggregator: &mut ResultAggregator,
        plan_updater: &mut PlanUpdater,
        halted: &mut bool,
        cancel_tx: &watch::Sender<bool>,
        start: Instant,
    ) -> Vec<TaskId> {
        let Completion { task_id, result } = completion;

        match result {
            Ok(outcome) => {
                consecutive_timeouts.insert(task_id.clone(), 0);
                self.transition(&task_id, TaskState::Succeeded, None, start);
                self.run_gates_and_finish(
                    task_id,
                    outcome,
                    step_outputs,
                    producer_artifacts,
                    known_artifacts,
                    in_degree,
                    aggregator,
                    plan_updater,
                    halted,
                    cancel_tx,
                    start,
                )
            }
            Err(task_error) if task_error.category == ErrorCategory::Cancelled => {
                self.transition(&task_id, TaskState::Cancelled, Some("run_cancelled".to_string()), start);
                self.finish_unsuccessful(&task_id, TaskState::Cancelled, aggregator, plan_updater);
                Vec::new()
            }
            Err(task_error) => {
                if task_error.category == ErrorCategory::Timeout {
                    *consecutive_timeouts.entry(task_id.clone()).or_insert(0) += 1;
                } else {
                    consecutive_timeouts.insert(task_id.clone(), 0);
                }
                self.transition(&task_id, TaskState::Failed, Some(task_error.category.to_string()), start);
                self.resolve_failure(
                    task_id,
                    &task_error.category,
                    in_degree,
                    aggregator,
                    plan_updater,
                    halted,
                    cancel_tx,
                    consecutive_timeouts,
                    start,
                )
            }
        }
    }

    #[allow(clippy::too_many_arguments, reason = "threading every accumulator through is clearer than a god-struct")]
    fn run_gates_and_finish(
        &mut self,
        task_id: TaskId,
        outcome: InvocationOutcome,
        step_outputs: &mut BTreeMap<TaskId, Value>,
        producer_artifacts: &mut BTreeMap<TaskId, Vec<ArtifactId>>,
        known_artifacts: &mut BTreeSet<ArtifactId>,
        in_degree: &mut BTreeMap<TaskId, usize>,
        aggregator: &mut ResultAggregator,
        plan_updater: &mut PlanUpdater,
        halted: &mut bool,
        cancel_tx: &watch::Sender<bool>,
        start: Instant,
    ) -> Vec<TaskId> {
        let Some(task) = self.tasks.get(&task_id).cloned() else { return Vec::new() };
        let empty_tests = Vec::new();
        let declared_tests = self.declared_tests.get(&task_id).unwrap_or(&empty_tests);

        let gate_result = {
            let ctx = GateContext {
                capability_id: &task.capability_id,
                output: &outcome.value,
                artifacts: &outcome.artifacts,
                known_artifact_ids: known_artifacts,
                declared_tests,
            };
            self.gate_runner.run(&ctx, &self.registry, &self.gate_weights)
        };

        let mut findings: Vec<conduit_core::ValidationFinding> = outcome.findings.clone();
        for result in &gate_result.results {
            findings.extend(result.findings.clone());
        }

        if !outcome.ok {
            self.transition(&task_id, TaskState::Failed, Some("worker_reported_failure".to_string()), start);
            let category = ErrorCategory::OutputValidationError;
            return self.resolve_failure(
                task_id,
                &category,
                in_degree,
                aggregator,
                plan_updater,
                halted,
                cancel_tx,
                &mut BTreeMap::new(),
                start,
            );
        }

        if !gate_result.passed {
            let critical_gate =
                gate_result.results.last().map_or(conduit_core::ids::GateId::Schema, |result| result.gate);
            self.transition(&task_id, TaskState::Failed, Some(format!("gate_failed:{critical_gate}")), start);
            let category = ErrorCategory::GateFailed(critical_gate);
            return self.resolve_failure(
                task_id,
                &category,
                in_degree,
                aggregator,
                plan_updater,
                halted,
                cancel_tx,
                &mut BTreeMap::new(),
                start,
            );
        }

        self.transition(&task_id, TaskState::Validated, None, start);
        self.transition(&task_id, TaskState::Reported, None, start);

        for artifact in &outcome.artifacts {
            known_artifacts.insert(artifact.id.clone());
            self.emit(StatusEvent::ArtifactPublished {
                artifact_id: artifact.id.clone(),
                producer: task_id.clone(),
            });
        }
        producer_artifacts
            .insert(task_id.clone(), outcome.artifacts.iter().map(|artifact| artifact.id.clone()).collect());
        step_outputs.insert(task_id.clone(), outcome.value.clone());

        let consumed: Vec<ArtifactId> = task
            .dependencies
            .iter()
            .filter_map(|dep| producer_artifacts.get(dep))
            .flat_map(|ids| ids.iter().cloned())
            .collect();

        aggregator.record_task(
            task_id.clone(),
            TaskState::Reported,
            outcome.attempts,
            outcome.elapsed_ms,
            Some(gate_result.overall_score),
            findings.clone(),
            task.required,
            outcome.artifacts.clone(),
            consumed.clone(),
        );
        plan_updater.record(
            task_id.clone(),
            PlanTaskOutcome {
                final_state: TaskState::Reported,
                attempts: outcome.attempts,
                elapsed_ms: outcome.elapsed_ms,
                artifact_ids: outcome.artifacts.iter().map(|artifact| artifact.id.clone()).collect(),
                findings_summary: FindingsSummary::from_findings(&findings),
                quality_score: Some(gate_result.overall_score),
            },
        );

        self.advance_dependents(&task_id, in_degree)
    }

    #[allow(clippy::too_many_arguments, reason = "threading every accumulator through is clearer than a god-struct")]
    fn resolve_failure(
        &mut self,
        task_id: TaskId,
        category: &ErrorCategory,
        in_degree: &mut BTreeMap<TaskId, usize>,
        aggregator: &mut ResultAggregator,
        plan_updater: &mut PlanUpdater,
        halted: &mut bool,
        cancel_tx: &watch::Sender<bool>,
        consecutive_timeouts: &mut BTreeMap<TaskId, u32>,
        start: Instant,
    ) -> Vec<TaskId> {
        let Some(task) = self.tasks.get(&task_id).cloned() else { return Vec::new() };
        let decision_engine = self
            .capabilities
            .get(&task_id)
            .map(DecisionEngine::new)
            .unwrap_or_else(|| DecisionEngine::new(&default_capability()));
        let ctx = DecisionContext {
            category,
            task: &task,
            attempts: task.attempt + 1,
            retry_budget: task.retry_budget,
            consecutive_timeouts: consecutive_timeouts.get(&task_id).copied().unwrap_or(0),
        };
        let action = decision_engine.decide(&ctx);

        match action {
            DecisionAction::Retry { .. } => {
                if let Some(task) = self.tasks.get_mut(&task_id) {
                    task.attempt += 1;
                }
                self.transition(&task_id, TaskState::Retrying, Some("retry".to_string()), start);
                vec![task_id]
            }
            DecisionAction::Skip => {
                self.transition(&task_id, TaskState::Skipped, Some("budget_exhausted".to_string()), start);
                self.finish_unsuccessful(&task_id, TaskState::Skipped, aggregator, plan_updater);
                self.cascade_skip(&task_id, in_degree, aggregator, plan_updater, start)
            }
            DecisionAction::Escalate => {
                self.finish_unsuccessful(&task_id, TaskState::Failed, aggregator, plan_updater);
                if task.required && matches!(self.failure_strategy, FailureStrategy::Halt) {
                    *halted = true;
                    let _ = cancel_tx.send(true);
                }
                self.advance_dependents(&task_id, in_degree)
            }
            DecisionAction::Halt => {
                self.finish_unsuccessful(&task_id, TaskState::Failed, aggregator, plan_updater);
                *halted = true;
                let _ = cancel_tx.send(true);
                Vec::new()
            }
            DecisionAction::Rollback => {
                self.finish_unsuccessful(&task_id, TaskState::Failed, aggregator, plan_updater);
                if let Some(handler) = &self.rollback_handler {
                    for completed in self.completed_in_reverse() {
                        let _ = handler.rollback(&completed);
                    }
                }
                *halted = true;
                let _ = cancel_tx.send(true);
                Vec::new()
            }
        }
    }

    fn finish_unsuccessful(
        &self,
        task_id: &TaskId,
        final_state: TaskState,
        aggregator: &mut ResultAggregator,
        plan_updater: &mut PlanUpdater,
    ) {
        let required = self.tasks.get(task_id).is_some_and(|task| task.required);
        aggregator.record_task(task_id.clone(), final_state, 0, 0, None, Vec::new(), required, Vec::new(), Vec::new());
        plan_updater.record(
            task_id.clone(),
            PlanTaskOutcome {
                final_state,
                attempts: self.tasks.get(task_id).map_or(0, |task| task.attempt + 1),
                elapsed_ms: 0,
                artifact_ids: Vec::new(),
                findings_summary: FindingsSummary::default(),
                quality_score: None,
            },
        );
    }

    /// Decrements in-degree for `task_id`'s direct successors whose
    /// predecessors are all terminal, transitioning them `Scheduled -> Ready`.
    fn advance_dependents(&mut self, task_id: &TaskId, in_degree: &mut BTreeMap<TaskId, usize>) -> Vec<TaskId> {
        let mut newly_ready = Vec::new();
        for successor in self.graph.successors(task_id).to_vec() {
            if let Some(degree) = in_degree.get_mut(&successor) {
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    let is_scheduled =
                        self.tasks.get(&successor).is_some_and(|task| task.state == TaskState::Scheduled);
                    if is_scheduled {
                        self.transition(&successor, TaskState::Ready, None, Instant::now());
                        newly_ready.push(successor);
                    }
                }
            }
        }
        newly_ready
    }

    /// Marks every not-yet-terminal transitive dependent of `task_id` as
    /// `SKIPPED` with reason `predecessor_failed`. Bypasses [`Task::transition`]
    /// because the fixed table only names `FAILED -> SKIPPED`, while a
    /// cascading dependent may still be `PENDING`, `SCHEDULED`, or `READY`.
    fn cascade_skip(
        &mut self,
        task_id: &TaskId,
        in_degree: &mut BTreeMap<TaskId, usize>,
        aggregator: &mut ResultAggregator,
        plan_updater: &mut PlanUpdater,
        start: Instant,
    ) -> Vec<TaskId> {
        let dependents = self.graph.transitive_successors(task_id);
        for dependent in &dependents {
            let Some(task) = self.tasks.get_mut(dependent) else { continue };
            if task.state.is_terminal() {
                continue;
            }
            let from = task.state;
            task.state = TaskState::Skipped;
            self.emit(StatusEvent::Transition {
                task_id: dependent.clone(),
                from,
                to: TaskState::Skipped,
                at_ms: elapsed_ms(start),
                reason: Some("predecessor_failed".to_string()),
            });
            self.finish_unsuccessful(dependent, TaskState::Skipped, aggregator, plan_updater);
            in_degree.insert(dependent.clone(), 0);
        }
        Vec::new()
    }

    fn cancel_not_started(
        &mut self,
        task_id: &TaskId,
        aggregator: &mut ResultAggregator,
        plan_updater: &mut PlanUpdater,
        start: Instant,
    ) {
        let next = match self.tasks.get(task_id).map(|task| task.state) {
            Some(TaskState::Scheduled | TaskState::Ready) => TaskState::Cancelled,
            _ => return,
        };
        self.transition(task_id, next, Some("run_halted".to_string()), start);
        self.finish_unsuccessful(task_id, TaskState::Cancelled, aggregator, plan_updater);
    }

    fn completed_in_reverse(&self) -> Vec<TaskId> {
        self.graph
            .topological_order()
            .iter()
            .rev()
            .filter(|id| self.tasks.get(*id).is_some_and(|task| task.state == TaskState::Reported))
            .cloned()
            .collect()
    }

    fn transition(&mut self, task_id: &TaskId, next: TaskState, reason: Option<String>, start: Instant) {
        let Some(task) = self.tasks.get_mut(task_id) else { return };
        let from = task.state;
        if task.transition(next).is_ok() {
            self.emit(StatusEvent::Transition {
                task_id: task_id.clone(),
                from,
                to: next,
                at_ms: elapsed_ms(start),
                reason,
            });
            if let Some(phase) = self.graph.phase_of(task_id) {
                if next == TaskState::Ready {
                    self.emit(StatusEvent::PhaseAdvanced { phase });
                }
            }
        }
    }

    fn emit(&self, event: StatusEvent) {
        for sink in &self.sinks {
            let _ = sink.observe(&event);
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn default_capability() -> Capability {
    Capability {
        id: conduit_core::ids::CapabilityId::new("__unbound__"),
        input_schema: serde_json::json!({}),
        output_schema: serde_json::json!({}),
        transport: conduit_core::Transport::InProcess { handler_id: "__unbound__".to_string() },
        max_concurrency: 1,
        default_timeout_ms: 0,
        retry_policy: conduit_core::RetryPolicy::none(),
        complexity_weight: 1.0,
        resource_class: None,
    }
}

fn continue_on_panic(_join_error: tokio::task::JoinError) -> Option<Completion> {
    None
}
