// crates/conduit-core/src/validation.rs
// ============================================================================
// Module: Validation Findings & Gate Results
// Description: The severity scale, per-gate findings, and gate scoring rules.
// Purpose: Give the Gate Runner a shared vocabulary for what a gate produced and
//          how that rolls up into a quality score.
// Dependencies: serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::ids::GateId;

/// Severity of one [`ValidationFinding`].
///
/// # Invariants
/// - Ordered `Info < Warning < Error < Critical`; a `Critical` finding forces the
///   owning gate's score to `0` and halts the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; does not affect scoring.
    Info,
    /// Lowers the gate's score but does not fail it.
    Warning,
    /// Lowers the gate's score more heavily but does not fail it.
    Error,
    /// Forces the gate's (and the Run's) score to zero and halts the gate chain.
    Critical,
}

/// One finding emitted by a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Severity of this finding.
    pub severity: Severity,
    /// Gate that emitted this finding.
    pub gate: GateId,
    /// JSON-pointer-like path inside the output where the finding applies.
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

/// The outcome of running one gate in the chain.
///
/// # Invariants
/// - `score` is `1.0` minus the weighted penalty from `findings`, floored at `0`,
///   and forced to `0` if any finding is [`Severity::Critical`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    /// Gate this result belongs to.
    pub gate: GateId,
    /// Whether the gate passed (no critical finding).
    pub passed: bool,
    /// All findings emitted by this gate.
    pub findings: Vec<ValidationFinding>,
    /// Wall-clock time the gate took to run.
    pub elapsed_ms: u64,
    /// Score in `[0, 1]` for this gate.
    pub score: f64,
}

impl GateResult {
    /// Builds a result from raw findings, computing `passed` and `score` per
    /// the fixed scoring rule: `1.0 - 0.2*warnings - 0.5*errors`, floored at
    /// `0`, and `0` outright if any finding is critical.
    #[must_use]
    pub fn from_findings(gate: GateId, findings: Vec<ValidationFinding>, elapsed_ms: u64) -> Self {
        let has_critical = findings.iter().any(|f| f.severity == Severity::Critical);
        let warnings = findings.iter().filter(|f| f.severity == Severity::Warning).count();
        let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();

        #[allow(
            clippy::cast_precision_loss,
            reason = "finding counts per gate stay far below f64's exact-integer range"
        )]
        let score = if has_critical {
            0.0
        } else {
            (1.0 - 0.2 * warnings as f64 - 0.5 * errors as f64).max(0.0)
        };

        Self { gate, passed: !has_critical, findings, elapsed_ms, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity) -> ValidationFinding {
        ValidationFinding {
            severity,
            gate: GateId::Schema,
            path: "$".to_string(),
            message: "test".to_string(),
        }
    }

    #[test]
    fn clean_pass_scores_one() {
        let result = GateResult::from_findings(GateId::Schema, vec![], 0);
        assert!((result.score - 1.0).abs() < f64::EPSILON);
        assert!(result.passed);
    }

    #[test]
    fn critical_forces_zero_and_fails() {
        let result = GateResult::from_findings(GateId::Security, vec![finding(Severity::Critical)], 0);
        assert_eq!(result.score, 0.0);
        assert!(!result.passed);
    }

    #[test]
    fn warning_never_raises_score_above_clean() {
        let clean = GateResult::from_findings(GateId::Schema, vec![], 0);
        let warned = GateResult::from_findings(GateId::Schema, vec![finding(Severity::Warning)], 0);
        assert!(warned.score <= clean.score);
    }

    #[test]
    fn score_floors_at_zero() {
        let findings = vec![finding(Severity::Error); 5];
        let result = GateResult::from_findings(GateId::Testing, findings, 0);
        assert_eq!(result.score, 0.0);
    }
}
