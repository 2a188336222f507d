// crates/conduit-status/src/sink/channel.rs
// ============================================================================
// Module: Channel Sink
// Description: Forwards StatusEvents onto a bounded async channel.
// Purpose: Let an async consumer (CLI progress bar, system test) observe
//          events without itself implementing StatusSink.
// Dependencies: conduit-core, tokio
// ============================================================================

use conduit_core::SinkError;
use conduit_core::StatusEvent;
use conduit_core::StatusSink;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

/// A [`StatusSink`] that forwards every event onto a bounded channel.
///
/// # Invariants
/// - Never blocks the caller; a full channel is reported as [`SinkError::DeliveryFailed`]
///   rather than awaited, matching `StatusSink`'s "bounded, local operation" contract.
pub struct ChannelSink {
    sender: Sender<StatusEvent>,
}

impl ChannelSink {
    /// Wraps `sender` as a [`StatusSink`].
    #[must_use]
    pub fn new(sender: Sender<StatusEvent>) -> Self {
        Self { sender }
    }
}

impl StatusSink for ChannelSink {
    fn observe(&self, event: &StatusEvent) -> Result<(), SinkError> {
        match self.sender.try_send(event.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SinkError::DeliveryFailed("channel full".to_string())),
            Err(TrySendError::Closed(_)) => Err(SinkError::DeliveryFailed("channel closed".to_string())),
        }
    }
}
