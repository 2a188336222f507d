// crates/conduit-core/src/ids.rs
// ============================================================================
// Module: Identifiers
// Description: Opaque, strongly typed identifiers used throughout the orchestration runtime.
// Purpose: Prevent accidental mixing of run/task/capability/artifact/gate identifiers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque and serialize as strings or numbers on the wire.
//! `PhaseNumber` is the one identifier that is also an ordering: phases are
//! assigned by the Dependency Graph's level assignment and compared
//! numerically, never hardcoded to a fixed count.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Identifies one end-to-end Run.
///
/// # Invariants
/// - Opaque UTF-8 string; the Run Config supplies it and the core never derives it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Creates a new run identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifies one Task within a Run.
///
/// # Invariants
/// - Unique within the owning Run; assigned deterministically by the Task Extractor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new task identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Identifies a declared Capability.
///
/// # Invariants
/// - Stable across runs; resolved against the Schema Registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityId(String);

impl CapabilityId {
    /// Creates a new capability identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CapabilityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifies an Artifact by the pair of (producing task, local name).
///
/// # Invariants
/// - Distinct from content hash: two artifacts may share an `ArtifactId`'s name
///   across tasks but never within the same producing task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Creates a new artifact identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ArtifactId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifies one stage of the fixed Gate Runner chain.
///
/// # Invariants
/// - Matches one of the five fixed gate names (`schema`, `syntax`, `dependency`,
///   `security`, `testing`); the Gate Runner never invents new identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateId {
    /// Output value conforms to the declared output schema.
    Schema,
    /// Textual artifacts tagged with a language parse successfully.
    Syntax,
    /// References inside the output resolve inside the Artifact store.
    Dependency,
    /// Rule-set match against well-known anti-patterns.
    Security,
    /// Declared tests, if any, pass.
    Testing,
}

impl GateId {
    /// Returns the fixed gate order, first to last.
    #[must_use]
    pub const fn chain_order() -> [Self; 5] {
        [Self::Schema, Self::Syntax, Self::Dependency, Self::Security, Self::Testing]
    }

    /// Returns the stable lowercase name used in error identifiers like `gate_failed:security`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Syntax => "syntax",
            Self::Dependency => "dependency",
            Self::Security => "security",
            Self::Testing => "testing",
        }
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A phase number assigned by the Dependency Graph's level assignment.
///
/// # Invariants
/// - Phase 0 is the set of vertices with in-degree 0.
/// - Never a fixed or hardcoded constant; always derived from the graph shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseNumber(u32);

impl PhaseNumber {
    /// The initial phase, assigned to vertices with no predecessors.
    pub const ZERO: Self = Self(0);

    /// Creates a phase number from a raw level value.
    #[must_use]
    pub const fn new(level: u32) -> Self {
        Self(level)
    }

    /// Returns the raw level value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the next phase number.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for PhaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
