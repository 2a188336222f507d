// crates/conduit-transport/src/in_process.rs
// ============================================================================
// Module: In-Process Transport
// Description: Direct function-call invocation within the host process.
// Purpose: Let test fixtures and built-in capabilities skip process/network overhead.
// Dependencies: tokio, serde_json
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::contract::InvocationContext;
use crate::contract::Invoke;
use crate::contract::InvokeError;

/// A handler registered under an in-process capability's `handler_id`.
///
/// # Invariants
/// - Must never panic; a handler that fails returns an `Err`, not a panic,
///   so one misbehaving capability cannot bring down the engine.
#[async_trait::async_trait]
pub trait InProcessHandler: Send + Sync {
    /// Runs the handler against `input`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] when the handler cannot produce an output.
    async fn call(&self, input: Value) -> Result<Value, InvokeError>;
}

#[async_trait::async_trait]
impl<F> InProcessHandler for F
where
    F: Fn(Value) -> Result<Value, InvokeError> + Send + Sync,
{
    async fn call(&self, input: Value) -> Result<Value, InvokeError> {
        self(input)
    }
}

/// Maps in-process handler identifiers to their implementation.
///
/// # Invariants
/// - Registration is expected at startup, before any Run begins; lookups
///   during a Run never mutate the registry.
#[derive(Default, Clone)]
pub struct InProcessRegistry {
    handlers: HashMap<String, Arc<dyn InProcessHandler>>,
}

impl InProcessRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Registers `handler` under `handler_id`, replacing any prior entry.
    pub fn register(&mut self, handler_id: impl Into<String>, handler: Arc<dyn InProcessHandler>) {
        self.handlers.insert(handler_id.into(), handler);
    }

    /// Looks up the handler registered under `handler_id`.
    #[must_use]
    pub fn get(&self, handler_id: &str) -> Option<Arc<dyn InProcessHandler>> {
        self.handlers.get(handler_id).cloned()
    }
}

struct InProcessWorker {
    handler: Arc<dyn InProcessHandler>,
}

#[async_trait::async_trait]
impl Invoke for InProcessWorker {
    async fn invoke(&self, input: Value, ctx: &InvocationContext) -> Result<Value, InvokeError> {
        if ctx.is_cancelled() {
            return Err(InvokeError::Cancelled);
        }
        let mut ctx = ctx.clone();
        tokio::select! {
            result = self.handler.call(input) => result,
            err = ctx.race_to_interrupt() => Err(err),
        }
    }
}

impl InProcessRegistry {
    /// Wraps the handler registered under `handler_id` as an [`Invoke`].
    #[must_use]
    pub fn invoker(&self, handler_id: &str) -> Option<Arc<dyn Invoke>> {
        self.get(handler_id).map(|handler| Arc::new(InProcessWorker { handler }) as Arc<dyn Invoke>)
    }
}
