// crates/conduit-engine/src/gate/schema.rs
// ============================================================================
// Module: Schema Gate
// Description: Validates a task's output against its capability's output schema.
// Purpose: First gate in the chain — nothing downstream can trust an output
//          shape the capability itself did not promise.
// Dependencies: conduit-contract
// ============================================================================

use conduit_contract::SchemaRegistry;
use conduit_core::ids::GateId;
use conduit_core::ValidationFinding;

use super::GateContext;
use super::critical;
use super::Gate;

/// Validates the output value against the capability's declared output schema.
///
/// A schema mismatch is always [`conduit_core::Severity::Critical`]: an
/// output that does not conform to its own contract cannot be trusted by any
/// later gate or by a downstream task's `$steps.*` reference.
pub struct SchemaGate;

impl Gate for SchemaGate {
    fn id(&self) -> GateId {
        GateId::Schema
    }

    fn evaluate(&self, ctx: &GateContext<'_>, registry: &SchemaRegistry) -> Vec<ValidationFinding> {
        match registry.validate_output(ctx.capability_id, ctx.output) {
            Ok(errors) => errors.into_iter().map(|message| critical(GateId::Schema, "$", message)).collect(),
            Err(err) => vec![critical(GateId::Schema, "$", err.to_string())],
        }
    }
}
