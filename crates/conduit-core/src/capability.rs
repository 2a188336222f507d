// crates/conduit-core/src/capability.rs
// ============================================================================
// Module: Capability
// Description: Declared worker kinds, their transport binding, and retry policy.
// Purpose: Give the Task Extractor and Agent Invoker a single immutable description
//          of what a capability accepts, returns, and how it is reached.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A Capability is immutable for the life of a Run. Its schemas are opaque
//! JSON Schema documents validated by `conduit-contract`'s Schema Registry;
//! this crate only carries the reference, not the validation logic, to keep
//! `conduit-core` free of a `jsonschema` dependency.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ids::CapabilityId;

/// One of the four transport kinds a Capability may be bound to.
///
/// # Invariants
/// - Closed set; the Agent Invoker is transport-blind and matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transport {
    /// Direct function call within the host process.
    InProcess {
        /// Identifier of the registered in-process handler.
        handler_id: String,
    },
    /// Long-lived child process exchanging framed JSON on stdin/stdout.
    Stdio {
        /// Executable to spawn.
        command: String,
        /// Arguments passed to the executable.
        args: Vec<String>,
        /// Working directory for the child process.
        cwd: Option<String>,
        /// Number of pooled processes for this capability.
        pool_size: u32,
    },
    /// Request/response over HTTP.
    Http {
        /// Target URL.
        url: String,
        /// HTTP method, defaulting to POST.
        #[serde(default = "default_http_method")]
        method: String,
    },
    /// Spawn a container with a mounted working directory.
    Container {
        /// Container image reference.
        image: String,
        /// Arguments passed to the container entrypoint.
        args: Vec<String>,
        /// Host directory mounted into the container.
        mount_dir: Option<String>,
    },
}

fn default_http_method() -> String {
    "POST".to_string()
}

/// Exponential backoff parameters for retryable errors.
///
/// # Invariants
/// - `base_ms <= cap_ms` is expected but not enforced at construction; callers
///   that violate it simply see every delay clamped to `cap_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Base delay in milliseconds before the first retry.
    pub base_ms: u64,
    /// Multiplicative factor applied to the delay after each retry.
    pub factor: f64,
    /// Jitter fraction in `[0, 1]` applied as +/- to the computed delay.
    pub jitter: f64,
    /// Upper bound on any single computed delay.
    pub cap_ms: u64,
}

impl RetryPolicy {
    /// A policy with no retries: exactly one attempt.
    #[must_use]
    pub const fn none() -> Self {
        Self { max_retries: 0, base_ms: 0, factor: 1.0, jitter: 0.0, cap_ms: 0 }
    }

    /// Computes the jittered delay before the given retry attempt (`attempt`
    /// is 1-based: the delay before the first retry is `attempt == 1`),
    /// perturbing the exponential backoff by up to `+/- jitter` of itself.
    #[must_use]
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        if attempt == 0 {
            return 0;
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "attempt counts stay far below f64's exact-integer range"
        )]
        let scaled = self.base_ms as f64 * self.factor.powi(attempt.saturating_sub(1) as i32);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "scaled is non-negative and clamped to cap_ms before truncation"
        )]
        let capped_ms = scaled.min(self.cap_ms as f64).max(0.0) as u64;
        apply_jitter(capped_ms, self.jitter).min(self.cap_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2, base_ms: 200, factor: 2.0, jitter: 0.1, cap_ms: 10_000 }
    }
}

/// Perturbs `delay_ms` by up to `+/- fraction` of itself, uniformly at random.
fn apply_jitter(delay_ms: u64, fraction: f64) -> u64 {
    if fraction <= 0.0 {
        return delay_ms;
    }
    #[allow(clippy::cast_precision_loss, reason = "delays stay far below f64's exact-integer range")]
    let delay = delay_ms as f64;
    let range = delay * fraction;
    let offset = rand::random::<f64>() * range * 2.0 - range;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "jittered is non-negative, clamped by the caller before truncation"
    )]
    let jittered = (delay + offset).max(0.0) as u64;
    jittered
}

/// A declared worker kind: stable identifier, schemas, transport, and limits.
///
/// # Invariants
/// - `id` is unique within the Schema Registry that owns this Capability.
/// - Immutable for the life of a Run; the engine never mutates a Capability in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Stable capability identifier.
    pub id: CapabilityId,
    /// JSON Schema document for the accepted input shape.
    pub input_schema: Value,
    /// JSON Schema document for the returned output shape.
    pub output_schema: Value,
    /// Transport binding used to invoke this capability.
    pub transport: Transport,
    /// Maximum number of concurrent in-flight attempts for this capability.
    pub max_concurrency: u32,
    /// Default per-attempt timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Retry policy applied to retryable errors from this capability.
    pub retry_policy: RetryPolicy,
    /// Declared complexity weight used by the Task Extractor's scheduling heuristic.
    #[serde(default = "default_complexity_weight")]
    pub complexity_weight: f64,
    /// Resource-class tag used by the `by-resource` parallel-blocking strategy.
    #[serde(default)]
    pub resource_class: Option<String>,
}

fn default_complexity_weight() -> f64 {
    1.0
}
