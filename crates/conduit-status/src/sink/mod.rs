// crates/conduit-status/src/sink/mod.rs
// ============================================================================
// Module: Status Sinks
// Description: Reference StatusSink implementations.
// Purpose: Give callers ready-made ways to observe Run progress without
//          writing their own StatusSink.
// Dependencies: conduit-core
// ============================================================================

/// Synchronous-closure status sink, mainly for tests.
pub mod callback;
/// Channel-backed status sink for async consumers.
pub mod channel;
/// Structured-line status sink writing to any `Write`.
pub mod log;

pub use callback::CallbackSink;
pub use channel::ChannelSink;
pub use log::LogSink;
