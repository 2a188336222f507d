// crates/conduit-store-sqlite/src/lib.rs
// ============================================================================
// Module: Conduit SQLite Store
// Description: Optional durable StatusSink and replay reader backed by SQLite.
// Purpose: Let a Run's event history survive process restarts without making
//          persistence a requirement for the engine itself.
// Dependencies: rusqlite, conduit-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Persistence is explicitly optional (§6.4): the engine works end to end
//! with an in-memory [`conduit_status::Tracker`] alone. This crate adds one
//! more [`conduit_core::StatusSink`] that appends every event to a SQLite
//! table as canonical JSON, and a reader that replays a Run's event log back
//! into the latest task states and lineage, for resuming or auditing after a
//! restart.

#![deny(missing_docs)]

/// SQLite-backed event store and run-scoped sink.
pub mod store;

pub use store::RunScopedSink;
pub use store::SqliteStatusStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
