// crates/conduit-core/src/lineage.rs
// ============================================================================
// Module: Lineage
// Description: Records which artifacts fed into which, for the aggregator's lineage graph.
// Purpose: Let the Result Aggregator answer "what produced this, and from what".
// Dependencies: serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::ids::ArtifactId;
use crate::ids::TaskId;

/// For one Artifact: the Task that produced it and the Artifacts that Task consumed.
///
/// # Invariants
/// - `consumed` must transitively agree with the Dependency Graph: every artifact
///   listed there was produced by a Task that is an ancestor of `producer` in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageRecord {
    /// Artifact this record describes.
    pub artifact: ArtifactId,
    /// Task that produced `artifact`.
    pub producer: TaskId,
    /// Artifacts consumed by `producer` while producing `artifact`.
    pub consumed: Vec<ArtifactId>,
}
