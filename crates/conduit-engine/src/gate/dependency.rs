// crates/conduit-engine/src/gate/dependency.rs
// ============================================================================
// Module: Dependency Gate
// Description: Checks that artifact cross-references inside the output resolve.
// Purpose: Catch a worker that emits a dangling `$artifact.<id>` reference
//          before it reaches the Result Aggregator's lineage graph.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Workers may cross-reference another artifact from the same output, or
//! from a predecessor task, using the same `$`-prefixed idiom the reference
//! substitution module uses for `$input`/`$steps`: a literal string of the
//! form `$artifact.<id>`. This gate is the one place that idiom is resolved
//! against the Artifact store rather than the input bag.

use conduit_core::ids::ArtifactId;
use conduit_core::ids::GateId;
use conduit_core::ValidationFinding;
use serde_json::Value;

use super::error;
use super::GateContext;
use super::Gate;

/// Checks every `$artifact.<id>` reference inside the output and declared
/// artifacts resolves to either this output's own artifacts or a
/// predecessor's.
pub struct DependencyGate;

impl Gate for DependencyGate {
    fn id(&self) -> GateId {
        GateId::Dependency
    }

    fn evaluate(&self, ctx: &GateContext<'_>, _registry: &conduit_contract::SchemaRegistry) -> Vec<ValidationFinding> {
        let own_ids: std::collections::BTreeSet<ArtifactId> =
            ctx.artifacts.iter().map(|artifact| artifact.id.clone()).collect();

        let mut findings = Vec::new();
        let mut check = |value: &Value, path: &str| {
            find_artifact_references(value, &mut |reference| {
                let id = ArtifactId::new(reference.clone());
                if !own_ids.contains(&id) && !ctx.known_artifact_ids.contains(&id) {
                    findings.push(error(
                        GateId::Dependency,
                        path.to_string(),
                        format!("dangling artifact reference: {reference}"),
                    ));
                }
            });
        };
        check(ctx.output, "$");
        for artifact in ctx.artifacts {
            if let conduit_core::artifact::ArtifactPayload::Json(value) = &artifact.payload {
                check(value, &format!("$.artifacts.{}", artifact.id.as_str()));
            }
        }
        findings
    }
}

fn find_artifact_references(value: &Value, visit: &mut impl FnMut(String)) {
    match value {
        Value::String(raw) => {
            if let Some(id) = raw.strip_prefix("$artifact.") {
                visit(id.to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                find_artifact_references(item, visit);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                find_artifact_references(item, visit);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::ids::CapabilityId;
    use serde_json::json;
    use std::collections::BTreeSet;

    #[test]
    fn reference_to_own_artifact_resolves() {
        let capability_id = CapabilityId::new("echo");
        let output = json!({"ref": "$artifact.a1"});
        let artifacts = vec![];
        let mut known = BTreeSet::new();
        known.insert(ArtifactId::new("a1"));
        let tests = Vec::new();
        let ctx = GateContext {
            capability_id: &capability_id,
            output: &output,
            artifacts: &artifacts,
            known_artifact_ids: &known,
            declared_tests: &tests,
        };
        assert!(DependencyGate.evaluate(&ctx, &conduit_contract::SchemaRegistry::new()).is_empty());
    }

    #[test]
    fn dangling_reference_is_an_error() {
        let capability_id = CapabilityId::new("echo");
        let output = json!({"ref": "$artifact.missing"});
        let artifacts = vec![];
        let known = BTreeSet::new();
        let tests = Vec::new();
        let ctx = GateContext {
            capability_id: &capability_id,
            output: &output,
            artifacts: &artifacts,
            known_artifact_ids: &known,
            declared_tests: &tests,
        };
        let findings = DependencyGate.evaluate(&ctx, &conduit_contract::SchemaRegistry::new());
        assert_eq!(findings.len(), 1);
    }
}
