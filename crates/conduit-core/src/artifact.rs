// crates/conduit-core/src/artifact.rs
// ============================================================================
// Module: Artifact
// Description: Named, typed output fragments produced by workers.
// Purpose: Give the Result Aggregator a content-addressed unit to deduplicate on.
// Dependencies: serde, serde_json, crate::hashing, crate::ids
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::hashing::ContentHash;
use crate::ids::ArtifactId;
use crate::ids::TaskId;

/// Either a structured JSON value or a raw byte payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactPayload {
    /// Structured output value.
    Json(Value),
    /// Raw bytes, base64-encoded on the wire by serde's default `Vec<u8>` handling.
    Bytes(Vec<u8>),
}

/// A named, typed output fragment produced by a worker.
///
/// # Invariants
/// - `content_hash` is computed from `payload` and never recomputed after construction.
/// - Two artifacts with equal `content_hash` are duplicates; the aggregator keeps one
///   canonical instance and turns the rest into [`ArtifactRef`] cross-references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Identifier, unique within the producing Task.
    pub id: ArtifactId,
    /// Task that produced this artifact.
    pub producer: TaskId,
    /// Content-type tag (e.g. `application/json`, `text/x-rust`).
    pub content_type: String,
    /// The artifact's payload.
    pub payload: ArtifactPayload,
    /// Content hash of `payload`.
    pub content_hash: ContentHash,
}

/// A reference to a canonical [`Artifact`] instance, used when a duplicate by
/// content hash is folded into the canonical one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Identifier this reference was originally published under.
    pub id: ArtifactId,
    /// Task that originally produced the (now-deduplicated) artifact.
    pub producer: TaskId,
    /// Identifier of the canonical artifact this reference now points to.
    pub canonical_id: ArtifactId,
}
