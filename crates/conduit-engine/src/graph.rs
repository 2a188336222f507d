// crates/conduit-engine/src/graph.rs
// ============================================================================
// Module: Dependency Graph
// Description: Typed DAG of tasks with cycle detection, topological sort,
//              parallel-level assignment, and critical-path analysis.
// Purpose: Give the Phase Manager a schedule and the Task Extractor a place
//          to reject malformed plans before any task runs.
// Dependencies: conduit-core
// ============================================================================

//! ## Overview
//! Acyclicity is enforced at read time, not at insert time: [`DependencyGraph::new`]
//! takes the full vertex and edge set and computes everything (cycle check,
//! topological order, phase assignment) once, so a caller never observes a
//! graph in a partially-validated state.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;

use conduit_core::ids::PhaseNumber;
use conduit_core::ids::TaskId;
use conduit_core::DependencyEdge;

/// Errors raised while building or querying a [`DependencyGraph`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GraphError {
    /// The edge set contains a cycle; `cycle` names one offending cycle, in order.
    #[error("cycle detected: {}", cycle.iter().map(TaskId::as_str).collect::<Vec<_>>().join(" -> "))]
    CycleDetected {
        /// The vertices forming the cycle, in traversal order.
        cycle: Vec<TaskId>,
    },
    /// An edge references a vertex that was never declared.
    #[error("edge references unknown task: {0}")]
    UnknownVertex(TaskId),
}

/// A directed, acyclic graph over task identifiers.
///
/// # Invariants
/// - Acyclic: construction fails with [`GraphError::CycleDetected`] otherwise.
/// - Every edge's endpoints are declared vertices.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    vertices: BTreeSet<TaskId>,
    edges: Vec<DependencyEdge>,
    successors: BTreeMap<TaskId, Vec<TaskId>>,
    predecessors: BTreeMap<TaskId, Vec<TaskId>>,
    phases: BTreeMap<TaskId, PhaseNumber>,
    topo_order: Vec<TaskId>,
}

impl DependencyGraph {
    /// Builds a graph from `vertices` and `edges`, validating acyclicity and
    /// assigning a phase to every vertex by Kahn's-algorithm level assignment.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownVertex`] if an edge names a vertex not in
    /// `vertices`, or [`GraphError::CycleDetected`] if the edge set has a cycle.
    pub fn new(vertices: BTreeSet<TaskId>, edges: Vec<DependencyEdge>) -> Result<Self, GraphError> {
        let mut successors: BTreeMap<TaskId, Vec<TaskId>> =
            vertices.iter().map(|v| (v.clone(), Vec::new())).collect();
        let mut predecessors: BTreeMap<TaskId, Vec<TaskId>> =
            vertices.iter().map(|v| (v.clone(), Vec::new())).collect();
        for edge in &edges {
            if !vertices.contains(&edge.producer) {
                return Err(GraphError::UnknownVertex(edge.producer.clone()));
            }
            if !vertices.contains(&edge.consumer) {
                return Err(GraphError::UnknownVertex(edge.consumer.clone()));
            }
            successors.entry(edge.producer.clone()).or_default().push(edge.consumer.clone());
            predecessors.entry(edge.consumer.clone()).or_default().push(edge.producer.clone());
        }

        detect_cycle(&vertices, &successors)?;
        let topo_order = topological_order(&vertices, &predecessors, &successors);
        let phases = assign_phases(&vertices, &predecessors, &successors);

        Ok(Self { vertices, edges, successors, predecessors, phases, topo_order })
    }

    /// Returns every declared vertex.
    #[must_use]
    pub fn vertices(&self) -> &BTreeSet<TaskId> {
        &self.vertices
    }

    /// Returns every declared edge.
    #[must_use]
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Returns the direct successors of `task`.
    #[must_use]
    pub fn successors(&self, task: &TaskId) -> &[TaskId] {
        self.successors.get(task).map_or(&[], Vec::as_slice)
    }

    /// Returns the direct predecessors of `task`.
    #[must_use]
    pub fn predecessors(&self, task: &TaskId) -> &[TaskId] {
        self.predecessors.get(task).map_or(&[], Vec::as_slice)
    }

    /// Returns every transitive successor (dependent) of `task`, not
    /// including `task` itself.
    #[must_use]
    pub fn transitive_successors(&self, task: &TaskId) -> BTreeSet<TaskId> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(task.clone());
        while let Some(current) = queue.pop_front() {
            for successor in self.successors(&current) {
                if seen.insert(successor.clone()) {
                    queue.push_back(successor.clone());
                }
            }
        }
        seen
    }

    /// Returns the phase assigned to `task`.
    #[must_use]
    pub fn phase_of(&self, task: &TaskId) -> Option<PhaseNumber> {
        self.phases.get(task).copied()
    }

    /// Returns the highest phase number assigned to any vertex, or `None` for an empty graph.
    #[must_use]
    pub fn max_phase(&self) -> Option<PhaseNumber> {
        self.phases.values().copied().max()
    }

    /// Returns every vertex assigned to `phase`.
    #[must_use]
    pub fn vertices_in_phase(&self, phase: PhaseNumber) -> BTreeSet<TaskId> {
        self.phases.iter().filter(|(_, p)| **p == phase).map(|(v, _)| v.clone()).collect()
    }

    /// Returns vertices in a valid topological order (predecessors before successors).
    #[must_use]
    pub fn topological_order(&self) -> &[TaskId] {
        &self.topo_order
    }

    /// Computes the strongly-connected components of the graph via Tarjan's
    /// algorithm, each returned as the set of vertices it contains.
    ///
    /// A validated [`DependencyGraph`] is acyclic, so every component here is
    /// a singleton; the operation is still offered directly rather than left
    /// implicit, since a caller auditing a graph's structure should not have
    /// to re-derive it from the edge set.
    #[must_use]
    pub fn strongly_connected_components(&self) -> Vec<BTreeSet<TaskId>> {
        let mut finder = TarjanState::default();
        for vertex in &self.vertices {
            if !finder.index.contains_key(vertex) {
                finder.strong_connect(vertex, &self.successors);
            }
        }
        finder.components
    }

    /// Computes earliest-start, latest-start, and slack per vertex given
    /// expected durations, for critical-path analysis.
    ///
    /// Vertices absent from `durations` are treated as zero-duration.
    #[must_use]
    pub fn critical_path(&self, durations: &BTreeMap<TaskId, u64>) -> CriticalPath {
        let duration_of = |task: &TaskId| durations.get(task).copied().unwrap_or(0);

        let mut earliest_start: BTreeMap<TaskId, u64> = BTreeMap::new();
        for task in &self.topo_order {
            let start = self
                .predecessors(task)
                .iter()
                .map(|pred| earliest_start.get(pred).copied().unwrap_or(0) + duration_of(pred))
                .max()
                .unwrap_or(0);
            earliest_start.insert(task.clone(), start);
        }
        let project_end = self
            .topo_order
            .iter()
            .map(|task| earliest_start.get(task).copied().unwrap_or(0) + duration_of(task))
            .max()
            .unwrap_or(0);

        let mut latest_start: BTreeMap<TaskId, u64> = BTreeMap::new();
        for task in self.topo_order.iter().rev() {
            let latest_finish = self
                .successors(task)
                .iter()
                .map(|succ| latest_start.get(succ).copied().unwrap_or(project_end))
                .min()
                .unwrap_or(project_end);
            latest_start.insert(task.clone(), latest_finish.saturating_sub(duration_of(task)));
        }

        let slack = self
            .vertices
            .iter()
            .map(|task| {
                let es = earliest_start.get(task).copied().unwrap_or(0);
                let ls = latest_start.get(task).copied().unwrap_or(0);
                (task.clone(), ls.saturating_sub(es))
            })
            .collect();

        CriticalPath { earliest_start, latest_start, slack, project_duration: project_end }
    }
}

/// Earliest/latest start and slack per vertex, plus the overall project duration.
#[derive(Debug, Clone)]
pub struct CriticalPath {
    /// Earliest possible start time per vertex.
    pub earliest_start: BTreeMap<TaskId, u64>,
    /// Latest start time per vertex without delaying the project.
    pub latest_start: BTreeMap<TaskId, u64>,
    /// Slack (`latest_start - earliest_start`) per vertex; zero means on the critical path.
    pub slack: BTreeMap<TaskId, u64>,
    /// Total expected duration of the project.
    pub project_duration: u64,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

fn detect_cycle(
    vertices: &BTreeSet<TaskId>,
    successors: &BTreeMap<TaskId, Vec<TaskId>>,
) -> Result<(), GraphError> {
    let mut color: BTreeMap<TaskId, Color> = vertices.iter().map(|v| (v.clone(), Color::White)).collect();
    let mut stack: Vec<TaskId> = Vec::new();

    for start in vertices {
        if color.get(start) == Some(&Color::White)
            && let Some(cycle) = visit(start, successors, &mut color, &mut stack)
        {
            return Err(GraphError::CycleDetected { cycle });
        }
    }
    Ok(())
}

fn visit(
    task: &TaskId,
    successors: &BTreeMap<TaskId, Vec<TaskId>>,
    color: &mut BTreeMap<TaskId, Color>,
    stack: &mut Vec<TaskId>,
) -> Option<Vec<TaskId>> {
    color.insert(task.clone(), Color::Gray);
    stack.push(task.clone());

    for successor in successors.get(task).map_or(&[][..], Vec::as_slice) {
        match color.get(successor) {
            Some(Color::White) => {
                if let Some(cycle) = visit(successor, successors, color, stack) {
                    return Some(cycle);
                }
            }
            Some(Color::Gray) => {
                let start = stack.iter().position(|v| v == successor).unwrap_or(0);
                let mut cycle: Vec<TaskId> = stack[start..].to_vec();
                cycle.push(successor.clone());
                return Some(cycle);
            }
            Some(Color::Black) | None => {}
        }
    }

    stack.pop();
    color.insert(task.clone(), Color::Black);
    None
}

/// Running state for Tarjan's strongly-connected-components algorithm.
#[derive(Default)]
struct TarjanState {
    index: BTreeMap<TaskId, usize>,
    lowlink: BTreeMap<TaskId, usize>,
    on_stack: BTreeSet<TaskId>,
    stack: Vec<TaskId>,
    next_index: usize,
    components: Vec<BTreeSet<TaskId>>,
}

impl TarjanState {
    fn strong_connect(&mut self, vertex: &TaskId, successors: &BTreeMap<TaskId, Vec<TaskId>>) {
        self.index.insert(vertex.clone(), self.next_index);
        self.lowlink.insert(vertex.clone(), self.next_index);
        self.next_index += 1;
        self.stack.push(vertex.clone());
        self.on_stack.insert(vertex.clone());

        for successor in successors.get(vertex).map_or(&[][..], Vec::as_slice) {
            if !self.index.contains_key(successor) {
                self.strong_connect(successor, successors);
                if let Some(successor_low) = self.lowlink.get(successor).copied()
                    && let Some(low) = self.lowlink.get_mut(vertex)
                {
                    *low = (*low).min(successor_low);
                }
            } else if self.on_stack.contains(successor)
                && let Some(successor_index) = self.index.get(successor).copied()
                && let Some(low) = self.lowlink.get_mut(vertex)
            {
                *low = (*low).min(successor_index);
            }
        }

        let is_scc_root = match (self.lowlink.get(vertex), self.index.get(vertex)) {
            (Some(low), Some(idx)) => low == idx,
            _ => false,
        };
        if is_scc_root {
            let mut component = BTreeSet::new();
            loop {
                let Some(member) = self.stack.pop() else { break };
                self.on_stack.remove(&member);
                let is_root = member == *vertex;
                component.insert(member);
                if is_root {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}

fn topological_order(
    vertices: &BTreeSet<TaskId>,
    predecessors: &BTreeMap<TaskId, Vec<TaskId>>,
    successors: &BTreeMap<TaskId, Vec<TaskId>>,
) -> Vec<TaskId> {
    let mut in_degree: BTreeMap<TaskId, usize> =
        vertices.iter().map(|v| (v.clone(), predecessors.get(v).map_or(0, Vec::len))).collect();
    let mut ready: VecDeque<TaskId> =
        vertices.iter().filter(|v| in_degree.get(*v).copied().unwrap_or(0) == 0).cloned().collect();
    let mut order = Vec::with_capacity(vertices.len());

    while let Some(task) = ready.pop_front() {
        order.push(task.clone());
        for successor in successors.get(&task).map_or(&[][..], Vec::as_slice) {
            if let Some(degree) = in_degree.get_mut(successor) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push_back(successor.clone());
                }
            }
        }
    }
    order
}

fn assign_phases(
    vertices: &BTreeSet<TaskId>,
    predecessors: &BTreeMap<TaskId, Vec<TaskId>>,
    successors: &BTreeMap<TaskId, Vec<TaskId>>,
) -> BTreeMap<TaskId, PhaseNumber> {
    let order = topological_order(vertices, predecessors, successors);
    let mut phases: BTreeMap<TaskId, PhaseNumber> = BTreeMap::new();
    for task in &order {
        let phase = predecessors
            .get(task)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .filter_map(|pred| phases.get(pred))
            .map(|phase| phase.next())
            .max()
            .unwrap_or(PhaseNumber::ZERO);
        phases.insert(task.clone(), phase);
    }
    phases
}
