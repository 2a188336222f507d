// crates/conduit-engine/src/gate/testing.rs
// ============================================================================
// Module: Testing Gate
// Description: Runs a task's declared output assertions.
// Purpose: Last gate in the chain — checks the output actually satisfies the
//          task author's stated expectations, not just its schema shape.
// Dependencies: conduit-core, serde_json
// ============================================================================

use conduit_core::ids::GateId;
use conduit_core::reference::get_path;
use conduit_core::ValidationFinding;
use serde::Deserialize;
use serde_json::Value;

use super::critical;
use super::error;
use super::GateContext;
use super::Gate;

/// One declared assertion against a task's output: the value found at `path`
/// must equal `expected`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    /// Human-readable name, used in the failure message.
    pub name: String,
    /// Dotted path inside the output value to check.
    pub path: Vec<String>,
    /// Value the path must equal for the assertion to pass.
    pub expected: Value,
    /// When true, a failed assertion is critical instead of merely an error.
    #[serde(default)]
    pub required: bool,
}

/// Evaluates every declared [`TestCase`] against the output.
pub struct TestingGate;

impl Gate for TestingGate {
    fn id(&self) -> GateId {
        GateId::Testing
    }

    fn evaluate(&self, ctx: &GateContext<'_>, _registry: &conduit_contract::SchemaRegistry) -> Vec<ValidationFinding> {
        ctx.declared_tests
            .iter()
            .filter_map(|test| {
                let actual = get_path(ctx.output, &test.path);
                if actual == Some(&test.expected) {
                    None
                } else {
                    let path = format!("$.{}", test.path.join("."));
                    let message = format!("assertion `{}` failed: expected {}", test.name, test.expected);
                    Some(if test.required { critical(GateId::Testing, path, message) } else { error(GateId::Testing, path, message) })
                }
            })
            .collect()
    }
}
