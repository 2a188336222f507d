// crates/conduit-engine/src/lib.rs
// ============================================================================
// Module: Conduit Engine
// Description: The orchestration core — extraction, graph, scheduling,
//              invocation, validation gates, aggregation, and decisioning.
// Purpose: Turn a parsed plan into a DAG of tasks, run it phase by phase
//          against real workers, and return a validated, deduplicated result.
// Dependencies: conduit-core, conduit-contract, conduit-transport,
//               conduit-status, conduit-logic, tokio
// ============================================================================

//! ## Overview
//! The control flow named in the system overview —
//! `Task Extractor → Dependency Graph → Phase Manager → Resource Allocator →
//! Agent Invoker (via Transport Client) → Gate Runner → Result Aggregator →
//! Plan Updater` — is implemented as one module per stage. [`run::OrchestrationEngine`]
//! is the façade that wires them together; most callers only need it and
//! [`run::RunConfig`]-adjacent types re-exported from `conduit-core`.

#![deny(missing_docs)]

pub mod aggregator;
pub mod decision;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod graph;
pub mod invoker;
pub mod metrics;
pub mod phase_manager;
pub mod plan_updater;
pub mod resource;
pub mod run;

pub use error::OrchestrationError;
pub use extractor::PlanDocument;
pub use extractor::TaskExtractor;
pub use extractor::WorkItem;
pub use graph::DependencyGraph;
pub use graph::GraphError;
pub use run::OrchestrationEngine;
pub use run::RunHandle;
pub use run::RunResult;
