// crates/conduit-transport/src/contract.rs
// ============================================================================
// Module: Invocation Contract
// Description: The transport-blind invoke() signature every worker implements.
// Purpose: Give the Agent Invoker one call shape regardless of transport.
// Dependencies: tokio, serde_json
// ============================================================================

use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::time::Instant;

/// Errors an [`Invoke`] implementation may return.
///
/// # Invariants
/// - `Timeout` and `Cancelled` are not retried differently from other
///   categories by this crate; the Decision Engine (in `conduit-engine`)
///   owns remediation policy.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// The attempt's deadline elapsed before a response arrived.
    #[error("invocation timed out after {elapsed_ms}ms")]
    Timeout {
        /// Milliseconds elapsed before the timeout fired.
        elapsed_ms: u64,
    },
    /// The attempt was cancelled before it completed.
    #[error("invocation cancelled")]
    Cancelled,
    /// No in-process handler is registered under this identifier.
    #[error("unknown in-process handler: {0}")]
    UnknownHandler(String),
    /// The transport-level exchange failed (process spawn, network, etc).
    #[error("transport error: {0}")]
    Transport(String),
    /// The worker responded but the response could not be parsed as JSON.
    #[error("malformed worker response: {0}")]
    MalformedResponse(String),
}

/// Per-attempt deadline and cancellation signal passed to every transport.
#[derive(Clone)]
pub struct InvocationContext {
    deadline: Instant,
    cancel: watch::Receiver<bool>,
}

impl InvocationContext {
    /// Builds a context that expires after `timeout` from now, cancellable
    /// through the paired [`watch::Sender`].
    #[must_use]
    pub fn new(timeout: Duration, cancel: watch::Receiver<bool>) -> Self {
        Self { deadline: Instant::now() + timeout, cancel }
    }

    /// Remaining time before the deadline, zero if already past.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// True once the paired sender has signalled cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Awaits either the deadline or a cancellation signal, whichever is
    /// first, and reports which one fired.
    pub async fn race_to_interrupt(&mut self) -> InvokeError {
        let remaining = self.remaining();
        tokio::select! {
            () = tokio::time::sleep(remaining) => InvokeError::Timeout { elapsed_ms: duration_ms(remaining) },
            result = self.cancel.changed() => {
                match result {
                    Ok(()) if *self.cancel.borrow() => InvokeError::Cancelled,
                    _ => InvokeError::Cancelled,
                }
            }
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// A transport-blind worker invocation.
///
/// # Invariants
/// - Implementations never block past `ctx`'s deadline; they race their
///   transport-specific work against [`InvocationContext::race_to_interrupt`].
/// - Exactly one attempt is in flight per call; retries are the caller's
///   responsibility.
#[async_trait::async_trait]
pub trait Invoke: Send + Sync {
    /// Invokes the worker with `input`, returning its output value.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] on timeout, cancellation, transport failure,
    /// or a response that cannot be parsed.
    async fn invoke(&self, input: Value, ctx: &InvocationContext) -> Result<Value, InvokeError>;
}
