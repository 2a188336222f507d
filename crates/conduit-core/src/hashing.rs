// crates/conduit-core/src/hashing.rs
// ============================================================================
// Module: Content Hashing
// Description: Canonical-JSON and byte-level content hashing for artifact dedup.
// Purpose: Give the Result Aggregator a stable content hash to deduplicate artifacts on.
// Dependencies: sha2, serde_json, serde_jcs
// ============================================================================

//! ## Overview
//! Two artifacts with the same content hash are duplicates (data model
//! invariant). Hashing structured values goes through RFC 8785 canonical
//! JSON (`serde_jcs`) first so that key ordering never affects the digest;
//! raw byte payloads are hashed directly.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

/// Hash algorithm used for content addressing.
///
/// # Invariants
/// - Exactly one variant exists today; the type stays open so a future
///   algorithm can be added without breaking the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 over canonical bytes.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the stable wire label for this algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while hashing a value.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// The value could not be serialized to canonical JSON.
    #[error("failed to canonicalize value for hashing: {0}")]
    Canonicalize(String),
}

/// A content hash, rendered as a lowercase hex digest with its algorithm.
///
/// # Invariants
/// - `digest` is always lowercase hex, `2 * output_size` characters long for `algorithm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash {
    /// Algorithm used to produce `digest`.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub digest: String,
}

impl ContentHash {
    /// Hashes raw bytes directly.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self { algorithm: HashAlgorithm::Sha256, digest: hex_encode(&hasher.finalize()) }
    }

    /// Hashes a JSON value after canonicalizing it (stable key order, no
    /// insignificant whitespace), so structurally equal values always hash
    /// the same regardless of how they were constructed.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the value cannot be canonicalized.
    pub fn of_json(value: &serde_json::Value) -> Result<Self, HashError> {
        let canonical =
            serde_jcs::to_string(value).map_err(|err| HashError::Canonicalize(err.to_string()))?;
        Ok(Self::of_bytes(canonical.as_bytes()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
