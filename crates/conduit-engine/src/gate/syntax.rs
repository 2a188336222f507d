// crates/conduit-engine/src/gate/syntax.rs
// ============================================================================
// Module: Syntax Gate
// Description: Checks that textual artifacts tagged with a language parse.
// Purpose: Catch malformed generated code/config before it reaches a
//          downstream task or a human reviewer.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A full parser per language is out of scope; this gate runs the cheap,
//! structural check each content type affords: `application/json` and
//! `text/x-json` parse through `serde_json`, balanced-delimiter languages
//! (`text/x-rust`, `text/x-c`, `text/x-go`, ...) get a brace/paren/bracket
//! balance check. Content types this gate does not recognize are skipped,
//! not failed — an unrecognized type is not a syntax error.

use conduit_core::artifact::ArtifactPayload;
use conduit_core::ids::GateId;
use conduit_core::ValidationFinding;

use super::error;
use super::GateContext;
use super::Gate;

/// Checks declared artifacts with a recognized content type for syntactic well-formedness.
pub struct SyntaxGate;

impl Gate for SyntaxGate {
    fn id(&self) -> GateId {
        GateId::Syntax
    }

    fn evaluate(&self, ctx: &GateContext<'_>, _registry: &conduit_contract::SchemaRegistry) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();
        for artifact in ctx.artifacts {
            let ArtifactPayload::Json(serde_json::Value::String(text)) = &artifact.payload else {
                continue;
            };
            let path = format!("$.artifacts.{}", artifact.id.as_str());
            if artifact.content_type.ends_with("json") {
                if let Err(err) = serde_json::from_str::<serde_json::Value>(text) {
                    findings.push(error(GateId::Syntax, path, format!("invalid JSON: {err}")));
                }
            } else if artifact.content_type.starts_with("text/x-") {
                if let Some(message) = unbalanced_delimiters(text) {
                    findings.push(error(GateId::Syntax, path, message));
                }
            }
        }
        findings
    }
}

fn unbalanced_delimiters(text: &str) -> Option<String> {
    let mut stack = Vec::new();
    for ch in text.chars() {
        match ch {
            '(' | '[' | '{' => stack.push(ch),
            ')' => {
                if stack.pop() != Some('(') {
                    return Some("unbalanced ')'".to_string());
                }
            }
            ']' => {
                if stack.pop() != Some('[') {
                    return Some("unbalanced ']'".to_string());
                }
            }
            '}' => {
                if stack.pop() != Some('{') {
                    return Some("unbalanced '}'".to_string());
                }
            }
            _ => {}
        }
    }
    if stack.is_empty() { None } else { Some(format!("{} unclosed delimiter(s)", stack.len())) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::artifact::Artifact;
    use conduit_core::hashing::ContentHash;
    use conduit_core::ids::ArtifactId;
    use conduit_core::ids::CapabilityId;
    use conduit_core::ids::TaskId;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn artifact(content_type: &str, text: &str) -> Artifact {
        Artifact {
            id: ArtifactId::new("a1"),
            producer: TaskId::new("t1"),
            content_type: content_type.to_string(),
            payload: ArtifactPayload::Json(json!(text)),
            content_hash: ContentHash::of_bytes(text.as_bytes()),
        }
    }

    fn ctx<'a>(
        capability_id: &'a CapabilityId,
        output: &'a serde_json::Value,
        artifacts: &'a [Artifact],
        known: &'a BTreeSet<ArtifactId>,
        tests: &'a [super::super::testing::TestCase],
    ) -> GateContext<'a> {
        GateContext { capability_id, output, artifacts, known_artifact_ids: known, declared_tests: tests }
    }

    #[test]
    fn balanced_source_has_no_findings() {
        let capability_id = CapabilityId::new("echo");
        let output = json!({});
        let artifacts = vec![artifact("text/x-rust", "fn main() { let x = (1 + 2); }")];
        let known = BTreeSet::new();
        let tests = Vec::new();
        let context = ctx(&capability_id, &output, &artifacts, &known, &tests);
        assert!(SyntaxGate.evaluate(&context, &conduit_contract::SchemaRegistry::new()).is_empty());
    }

    #[test]
    fn unbalanced_source_is_an_error() {
        let capability_id = CapabilityId::new("echo");
        let output = json!({});
        let artifacts = vec![artifact("text/x-rust", "fn main() { let x = (1 + 2; }")];
        let known = BTreeSet::new();
        let tests = Vec::new();
        let context = ctx(&capability_id, &output, &artifacts, &known, &tests);
        let findings = SyntaxGate.evaluate(&context, &conduit_contract::SchemaRegistry::new());
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn malformed_json_artifact_is_an_error() {
        let capability_id = CapabilityId::new("echo");
        let output = json!({});
        let artifacts = vec![artifact("application/json", "{not json")];
        let known = BTreeSet::new();
        let tests = Vec::new();
        let context = ctx(&capability_id, &output, &artifacts, &known, &tests);
        assert_eq!(SyntaxGate.evaluate(&context, &conduit_contract::SchemaRegistry::new()).len(), 1);
    }

}
