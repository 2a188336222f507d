// crates/conduit-status/src/sink/callback.rs
// ============================================================================
// Module: Callback Sink
// Description: Runs a user-supplied closure for each StatusEvent.
// Purpose: Give tests and small embedders a StatusSink without a new type.
// Dependencies: conduit-core
// ============================================================================

use std::sync::Mutex;

use conduit_core::SinkError;
use conduit_core::StatusEvent;
use conduit_core::StatusSink;

/// A [`StatusSink`] that runs a closure for each event.
///
/// # Invariants
/// - The closure is called under an internal lock; it must return quickly
///   and never call back into the same `CallbackSink`.
pub struct CallbackSink<F> {
    callback: Mutex<F>,
}

impl<F> CallbackSink<F>
where
    F: FnMut(&StatusEvent) -> Result<(), SinkError> + Send,
{
    /// Wraps `callback` as a [`StatusSink`].
    #[must_use]
    pub fn new(callback: F) -> Self {
        Self { callback: Mutex::new(callback) }
    }
}

impl<F> StatusSink for CallbackSink<F>
where
    F: FnMut(&StatusEvent) -> Result<(), SinkError> + Send,
{
    fn observe(&self, event: &StatusEvent) -> Result<(), SinkError> {
        let mut callback = self
            .callback
            .lock()
            .map_err(|_| SinkError::DeliveryFailed("callback lock poisoned".to_string()))?;
        callback(event)
    }
}
