// crates/conduit-status/src/lib.rs
// ============================================================================
// Module: Conduit Status
// Description: In-memory status tracking and StatusSink fan-out.
// Purpose: Give every component a single place to publish, and subscribers a
//          single place to observe, Run progress.
// Dependencies: conduit-core, tokio, thiserror
// ============================================================================

//! ## Overview
//! [`conduit_core::StatusSink`] is the seam every observer implements. This
//! crate supplies the [`Tracker`] that keeps the latest known state of every
//! task and fans each event out to any number of subscriber sinks, plus
//! three reference sink implementations: [`sink::ChannelSink`] (async
//! consumers), [`sink::LogSink`] (structured lines to any `Write`), and
//! [`sink::CallbackSink`] (synchronous closures, mainly for tests).

#![deny(missing_docs)]

/// Status sink implementations (callback, channel, log).
pub mod sink;
/// Run/task status tracking types.
pub mod tracker;

pub use sink::CallbackSink;
pub use sink::ChannelSink;
pub use sink::LogSink;
pub use tracker::Tracker;
pub use tracker::TrackerSnapshot;
