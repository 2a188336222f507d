// crates/conduit-engine/src/gate/mod.rs
// ============================================================================
// Module: Gate Runner
// Description: Runs the fixed five-gate validation chain in order.
// Purpose: Turn one worker output into a sequence of per-gate findings and
//          an overall, weight-adjustable quality score.
// Dependencies: conduit-core, conduit-contract
// ============================================================================

//! ## Overview
//! The chain order is fixed (`schema -> syntax -> dependency -> security ->
//! testing`, per [`conduit_core::ids::GateId::chain_order`]) and never
//! reordered by configuration; only each gate's *weight* in the overall
//! score is configurable, via [`GateWeights`]. A [`Severity::Critical`]
//! finding from any gate stops the chain: later gates do not run, and the
//! overall score is forced to zero.

pub mod dependency;
/// Schema-validation gate.
pub mod schema;
pub mod security;
pub mod syntax;
/// Test-execution gate.
pub mod testing;

use std::collections::BTreeMap;

use conduit_contract::SchemaRegistry;
use conduit_core::artifact::Artifact;
use conduit_core::ids::CapabilityId;
use conduit_core::ids::GateId;
use conduit_core::GateResult;
use conduit_core::Severity;
use serde_json::Value;

pub use dependency::DependencyGate;
pub use schema::SchemaGate;
pub use security::SecurityGate;
pub use syntax::SyntaxGate;
pub use testing::TestingGate;

/// Everything one gate needs to evaluate a single task's output.
pub struct GateContext<'a> {
    /// Capability the task invoked, for schema lookups.
    pub capability_id: &'a CapabilityId,
    /// The worker's raw output value.
    pub output: &'a Value,
    /// Artifacts declared alongside the output.
    pub artifacts: &'a [Artifact],
    /// Identifiers of artifacts already known to the Run (from predecessor
    /// tasks), consulted by the Dependency gate.
    pub known_artifact_ids: &'a std::collections::BTreeSet<conduit_core::ids::ArtifactId>,
    /// Declared test assertions, if any, consulted by the Testing gate.
    pub declared_tests: &'a [testing::TestCase],
}

/// One stage of the fixed Gate Runner chain.
pub trait Gate: Send + Sync {
    /// This gate's fixed identifier.
    fn id(&self) -> GateId;

    /// Evaluates `ctx`, returning every finding produced. An empty vector
    /// means a clean pass.
    fn evaluate(&self, ctx: &GateContext<'_>, registry: &SchemaRegistry) -> Vec<conduit_core::ValidationFinding>;
}

/// Per-gate weight overrides for the overall quality score.
///
/// # Invariants
/// - A gate absent from the map uses the compiled-in default weight of `1.0`.
pub type GateWeights = BTreeMap<GateId, f64>;

/// Runs the fixed five-gate chain against one task's output.
pub struct GateRunner {
    gates: Vec<Box<dyn Gate>>,
}

impl Default for GateRunner {
    fn default() -> Self {
        Self {
            gates: vec![
                Box::new(SchemaGate),
                Box::new(SyntaxGate),
                Box::new(DependencyGate),
                Box::new(SecurityGate),
                Box::new(TestingGate),
            ],
        }
    }
}

/// The chain's outcome: one [`GateResult`] per gate that ran, and the
/// weighted overall score.
#[derive(Debug, Clone)]
pub struct GateChainResult {
    /// Results for every gate that ran, in chain order. Short-circuits after
    /// the first critical finding, so this may be shorter than five entries.
    pub results: Vec<GateResult>,
    /// Weighted mean of each gate's score, `0.0` if any gate produced a
    /// critical finding.
    pub overall_score: f64,
    /// True iff every gate that ran passed with no critical finding.
    pub passed: bool,
}

impl GateRunner {
    /// Builds the fixed five-gate chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every gate in chain order, short-circuiting after the first
    /// critical finding, and computes the weighted overall score.
    #[must_use]
    pub fn run(&self, ctx: &GateContext<'_>, registry: &SchemaRegistry, weights: &GateWeights) -> GateChainResult {
        let mut results = Vec::with_capacity(self.gates.len());
        let mut halted = false;

        for gate in &self.gates {
            let findings = gate.evaluate(ctx, registry);
            let result = GateResult::from_findings(gate.id(), findings, 0);
            let critical = !result.passed;
            results.push(result);
            if critical {
                halted = true;
                break;
            }
        }

        let overall_score = if halted {
            0.0
        } else {
            let mut weighted_sum = 0.0;
            let mut weight_total = 0.0;
            for result in &results {
                let weight = weights.get(&result.gate).copied().unwrap_or(1.0);
                weighted_sum += weight * result.score;
                weight_total += weight;
            }
            if weight_total > 0.0 { weighted_sum / weight_total } else { 0.0 }
        };

        let passed = !halted && results.iter().all(|result| result.passed);
        GateChainResult { results, overall_score, passed }
    }
}

fn critical(gate: GateId, path: impl Into<String>, message: impl Into<String>) -> conduit_core::ValidationFinding {
    conduit_core::ValidationFinding { severity: Severity::Critical, gate, path: path.into(), message: message.into() }
}

fn error(gate: GateId, path: impl Into<String>, message: impl Into<String>) -> conduit_core::ValidationFinding {
    conduit_core::ValidationFinding { severity: Severity::Error, gate, path: path.into(), message: message.into() }
}
