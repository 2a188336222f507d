// crates/conduit-config/src/model.rs
// ============================================================================
// Module: Config Model
// Description: The run-wide defaults a Run Config does not itself carry.
// Purpose: Separate operator-tunable defaults (concurrency, timeouts, gate
//          weights, storage) from per-Run input (conduit_core::RunConfig).
// Dependencies: conduit-core, serde
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;

use conduit_core::ids::GateId;
use conduit_core::RetryPolicy;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

/// Per-gate weight overrides for the Result Aggregator's quality score.
///
/// # Invariants
/// - A gate absent from `weights` uses the compiled-in default of `1.0`
///   (§9's "Decided" resolution for the open question on gate weighting).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateWeightsConfig {
    /// Explicit overrides, keyed by gate identifier.
    #[serde(flatten)]
    pub weights: BTreeMap<GateId, f64>,
}

impl GateWeightsConfig {
    /// Returns the configured weight for `gate`, or `1.0` if unset.
    #[must_use]
    pub fn weight_for(&self, gate: GateId) -> f64 {
        self.weights.get(&gate).copied().unwrap_or(1.0)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (gate, weight) in &self.weights {
            if !(0.0..=1.0).contains(weight) {
                return Err(ConfigError::Invalid(format!("gate weight for {gate} must be in [0, 1]: {weight}")));
            }
        }
        Ok(())
    }
}

/// Retry defaults applied to capabilities that do not declare their own policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicyConfig {
    /// Maximum retries after the first attempt.
    pub max_retries: u32,
    /// Base delay before the first retry, in milliseconds.
    pub base_ms: u64,
    /// Multiplicative backoff factor.
    pub factor: f64,
    /// Jitter fraction applied to each computed delay.
    pub jitter: f64,
    /// Upper bound on any single computed delay, in milliseconds.
    pub cap_ms: u64,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        let default = RetryPolicy::default();
        Self {
            max_retries: default.max_retries,
            base_ms: default.base_ms,
            factor: default.factor,
            jitter: default.jitter,
            cap_ms: default.cap_ms,
        }
    }
}

impl From<RetryPolicyConfig> for RetryPolicy {
    fn from(config: RetryPolicyConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_ms: config.base_ms,
            factor: config.factor,
            jitter: config.jitter,
            cap_ms: config.cap_ms,
        }
    }
}

/// Optional durable persistence backend for Run status events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// No persistence; Run state lives only in the in-memory Status Tracker.
    #[default]
    None,
    /// Persist events to a SQLite database at `path`.
    Sqlite {
        /// Path to the SQLite database file.
        path: PathBuf,
    },
}

/// Operator-tunable defaults for every Run started by this process.
///
/// # Invariants
/// - Values here are defaults; a [`conduit_core::RunConfig`] or a
///   Capability's own fields always take precedence when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Default cap on globally in-flight task attempts.
    pub global_concurrency: u32,
    /// Default per-attempt timeout applied when a Capability does not declare one.
    pub default_timeout_ms: u64,
    /// Default retry policy applied when a Capability does not declare one.
    pub retry_policy: RetryPolicyConfig,
    /// Gate weight overrides for the Result Aggregator's quality score.
    pub gate_weights: GateWeightsConfig,
    /// Optional durable persistence backend.
    pub store: StoreConfig,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            global_concurrency: 8,
            default_timeout_ms: 30_000,
            retry_policy: RetryPolicyConfig::default(),
            gate_weights: GateWeightsConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl OrchestrationConfig {
    /// Validates semantic constraints not expressible in the type system alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `global_concurrency` is zero,
    /// `default_timeout_ms` is zero, or any gate weight is out of `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.global_concurrency == 0 {
            return Err(ConfigError::Invalid("global_concurrency must be greater than zero".to_string()));
        }
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::Invalid("default_timeout_ms must be greater than zero".to_string()));
        }
        self.gate_weights.validate()?;
        Ok(())
    }
}
