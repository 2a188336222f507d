// crates/conduit-contract/src/document.rs
// ============================================================================
// Module: Contract Documents
// Description: Declarative capability contracts loadable alongside a plan.
// Purpose: Describe a capability's schemas, determinism, and output checks
//          independent of how it is invoked.
// Dependencies: serde, serde_json, conduit-core
// ============================================================================

//! ## Overview
//! A [`CapabilityContract`] is the authoring-time counterpart of a
//! [`conduit_core::Capability`]: it is what a capability author writes down,
//! the registry turns it into a compiled, run-ready entry.

use conduit_core::ids::CapabilityId;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// How reproducible a capability's output is expected to be.
///
/// Gate weighting and retry policy both read this: a `Deterministic`
/// capability that fails a gate is more likely to fail identically on
/// retry, which the Decision Engine takes into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeterminismClass {
    /// Same input always produces the same output.
    Deterministic,
    /// Output may vary between invocations of the same input.
    Nondeterministic,
    /// Determinism is unknown or unspecified by the author.
    Unspecified,
}

impl Default for DeterminismClass {
    fn default() -> Self {
        Self::Unspecified
    }
}

/// A single named check a capability's output is expected to satisfy,
/// beyond what the output JSON Schema alone can express.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckContract {
    /// Stable identifier for this check, referenced from gate findings.
    pub check_id: String,
    /// Human-readable description shown in validation findings.
    pub description: String,
    /// Which gate in the chain is expected to run this check.
    pub gate: conduit_core::ids::GateId,
}

/// The authoring-time declaration of a capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityContract {
    /// Identifier the Task Extractor binds tasks to.
    pub id: CapabilityId,
    /// JSON Schema the capability's input must satisfy.
    pub input_schema: Value,
    /// JSON Schema the capability's output must satisfy.
    pub output_schema: Value,
    /// Determinism class, consulted by the Decision Engine.
    #[serde(default)]
    pub determinism: DeterminismClass,
    /// Additional checks beyond schema validation.
    #[serde(default)]
    pub checks: Vec<CheckContract>,
}

impl CapabilityContract {
    /// Converts this contract into a runtime [`conduit_core::Capability`],
    /// filling in the transport and scheduling fields from defaults or the
    /// supplied overrides.
    #[must_use]
    pub fn into_capability(
        self,
        transport: conduit_core::Transport,
        max_concurrency: u32,
        default_timeout_ms: u64,
    ) -> conduit_core::Capability {
        conduit_core::Capability {
            id: self.id,
            input_schema: self.input_schema,
            output_schema: self.output_schema,
            transport,
            max_concurrency,
            default_timeout_ms,
            retry_policy: conduit_core::RetryPolicy::default(),
            complexity_weight: 1.0,
            resource_class: None,
        }
    }
}
