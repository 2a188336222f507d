// crates/conduit-engine/src/extractor.rs
// ============================================================================
// Module: Task Extractor
// Description: Turns a parsed plan document into a Task set and its Dependency Graph.
// Purpose: Give every other stage a fully-validated, acyclic Task set before
//          any task is scheduled.
// Dependencies: conduit-core, conduit-contract, serde_json
// ============================================================================

//! ## Overview
//! Extraction is all-or-nothing: [`TaskExtractor::extract`] either returns a
//! complete `(Vec<Task>, DependencyGraph)` pair or a fatal [`ExtractionError`]
//! before any task reaches `RUNNING`. Declared `depends_on` edges become
//! [`EdgeKind::Ordering`] edges; references discovered inside a work item's
//! input template become [`EdgeKind::Data`] edges, found via
//! `conduit_core::reference::find_references` so the Agent Invoker's
//! substitution step and this discovery step can never disagree about what
//! counts as a reference.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use conduit_contract::SchemaRegistry;
use conduit_core::ids::CapabilityId;
use conduit_core::ids::TaskId;
use conduit_core::reference::Reference;
use conduit_core::reference::find_references;
use conduit_core::DependencyEdge;
use conduit_core::EdgeKind;
use conduit_core::ExtractionError;
use conduit_core::Task;
use conduit_core::TaskState;
use serde::Deserialize;
use serde_json::Value;

use crate::graph::DependencyGraph;
use crate::graph::GraphError;

/// One unit of work as declared in a plan document, before binding to a
/// Capability or resolving references.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItem {
    /// Identifier unique within the plan.
    pub id: String,
    /// Capability this item is bound to.
    pub capability_id: String,
    /// Input template, possibly containing `$input.*`/`$steps.*` references.
    #[serde(default)]
    pub input: Value,
    /// Explicitly declared dependencies beyond those implied by references.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Scheduling priority; higher runs first among otherwise-ready tasks.
    #[serde(default)]
    pub priority: i32,
    /// Retry budget override; falls back to the capability's retry policy when absent.
    #[serde(default)]
    pub retry_budget: Option<u32>,
    /// Task-wide deadline override, in milliseconds from Run start.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
    /// When true, this task's unrecoverable failure escalates to `HALT`.
    #[serde(default)]
    pub required: bool,
    /// Assertions the Testing gate checks against this task's output.
    #[serde(default)]
    pub tests: Vec<crate::gate::testing::TestCase>,
}

/// A plan document: an ordered list of work items.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanDocument {
    /// Work items in declaration order.
    pub items: Vec<WorkItem>,
}

impl PlanDocument {
    /// Parses a plan document from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::SpecParse`] when `value` does not match
    /// the plan document shape.
    pub fn from_json(value: &Value) -> Result<Self, ExtractionError> {
        serde_json::from_value(value.clone()).map_err(|err| ExtractionError::SpecParse(err.to_string()))
    }

    /// Collects every work item's declared test assertions, keyed by task identifier.
    /// Items with no declared tests are omitted.
    #[must_use]
    pub fn declared_tests(&self) -> BTreeMap<TaskId, Vec<crate::gate::testing::TestCase>> {
        self.items
            .iter()
            .filter(|item| !item.tests.is_empty())
            .map(|item| (TaskId::new(item.id.clone()), item.tests.clone()))
            .collect()
    }
}

/// Extracts a Task set and its Dependency Graph from a [`PlanDocument`].
#[derive(Debug, Default)]
pub struct TaskExtractor;

impl TaskExtractor {
    /// Creates a new extractor. Stateless; kept as a type for symmetry with
    /// the other pipeline stages and to give extraction its own call site.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extracts tasks and builds the dependency graph for `plan`, binding
    /// every work item's capability against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::UnknownCapability`] when a work item names
    /// a capability `registry` does not know, [`ExtractionError::UnknownDependency`]
    /// when a declared or referenced dependency names a task absent from the
    /// plan, or [`ExtractionError::CycleDetected`] when the resulting edge set
    /// is not acyclic.
    pub fn extract(
        &self,
        plan: &PlanDocument,
        registry: &SchemaRegistry,
    ) -> Result<(Vec<Task>, DependencyGraph), ExtractionError> {
        let vertices: BTreeSet<TaskId> = plan.items.iter().map(|item| TaskId::new(item.id.clone())).collect();

        for item in &plan.items {
            let capability_id = CapabilityId::new(item.capability_id.clone());
            if !registry.contains(&capability_id) {
                return Err(ExtractionError::UnknownCapability {
                    task_id: TaskId::new(item.id.clone()),
                    capability_id: item.capability_id.clone(),
                });
            }
        }

        let mut edges = Vec::new();
        let mut dependencies_by_task: BTreeMap<TaskId, BTreeSet<TaskId>> = BTreeMap::new();

        for item in &plan.items {
            let task_id = TaskId::new(item.id.clone());

            for dependency in &item.depends_on {
                let dependency_id = TaskId::new(dependency.clone());
                if !vertices.contains(&dependency_id) {
                    return Err(ExtractionError::UnknownDependency {
                        task_id: task_id.clone(),
                        dependency_id: dependency.clone(),
                    });
                }
                edges.push(DependencyEdge {
                    producer: dependency_id.clone(),
                    consumer: task_id.clone(),
                    kind: EdgeKind::Ordering,
                });
                dependencies_by_task.entry(task_id.clone()).or_default().insert(dependency_id);
            }

            let mut referenced_unknown = None;
            find_references(&item.input, &mut |reference| {
                if let Reference::Step { task_id: producer, .. } = reference {
                    if vertices.contains(&producer) {
                        edges.push(DependencyEdge {
                            producer: producer.clone(),
                            consumer: task_id.clone(),
                            kind: EdgeKind::Data,
                        });
                        dependencies_by_task.entry(task_id.clone()).or_default().insert(producer);
                    } else if referenced_unknown.is_none() {
                        referenced_unknown = Some(producer);
                    }
                }
            });
            if let Some(producer) = referenced_unknown {
                return Err(ExtractionError::UnknownDependency {
                    task_id,
                    dependency_id: producer.as_str().to_string(),
                });
            }
        }

        let graph = DependencyGraph::new(vertices, edges).map_err(|err| match err {
            GraphError::CycleDetected { cycle } => ExtractionError::CycleDetected { cycle },
            GraphError::UnknownVertex(task_id) => ExtractionError::UnknownDependency {
                task_id: task_id.clone(),
                dependency_id: task_id.as_str().to_string(),
            },
        })?;

        let tasks = plan
            .items
            .iter()
            .map(|item| {
                let task_id = TaskId::new(item.id.clone());
                let dependencies: Vec<TaskId> = dependencies_by_task
                    .get(&task_id)
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .collect();
                let complexity_score = 1.0 + dependencies.len() as f64 * 0.1;
                Task {
                    id: task_id.clone(),
                    capability_id: CapabilityId::new(item.capability_id.clone()),
                    input_template: item.input.clone(),
                    dependencies,
                    phase: graph.phase_of(&task_id).unwrap_or(conduit_core::ids::PhaseNumber::ZERO),
                    priority: item.priority,
                    attempt: 0,
                    retry_budget: item.retry_budget.unwrap_or(0),
                    deadline_ms: item.deadline_ms,
                    required: item.required,
                    state: TaskState::Pending,
                    complexity_score,
                }
            })
            .collect();

        Ok((tasks, graph))
    }
}
