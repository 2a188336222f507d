// crates/conduit-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Status Store
// Description: Append-only event log backing an optional durable StatusSink.
// Purpose: Persist every StatusEvent for a Run and replay it back into task
//          states after a restart.
// Dependencies: conduit-core, rusqlite, serde_json, thiserror
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use conduit_core::ids::RunId;
use conduit_core::ids::TaskId;
use conduit_core::SinkError;
use conduit_core::StatusEvent;
use conduit_core::StatusSink;
use conduit_core::TaskState;
use rusqlite::Connection;
use rusqlite::params;

/// Default SQLite busy timeout, in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configuration for opening a [`SqliteStatusStore`].
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the SQLite database file. `:memory:` opens a private in-memory database.
    pub path: PathBuf,
    /// Busy timeout applied to the connection, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl SqliteStoreConfig {
    /// Builds a config pointing at `path` with the default busy timeout.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS }
    }

    /// Builds a config for a private in-memory database, mainly for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }
}

/// Errors raised while opening or using the store.
#[derive(Debug, thiserror::Error)]
pub enum SqliteStoreError {
    /// The underlying SQLite connection reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// An event or run identifier could not be serialized to JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The store's internal lock was poisoned by a prior panic.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// An append-only, replayable log of [`StatusEvent`]s for every Run, backed
/// by a single SQLite table.
///
/// # Invariants
/// - Events are appended in the order they are observed; `seq` is a
///   per-run monotonic counter, not a wall-clock timestamp.
/// - A write failure surfaces as [`SinkError::DeliveryFailed`] and never
///   panics, matching [`StatusSink`]'s contract.
pub struct SqliteStatusStore {
    connection: Mutex<Connection>,
}

impl SqliteStatusStore {
    /// Opens (creating if necessary) the database at `config.path` and
    /// ensures the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Sqlite`] if the connection cannot be
    /// opened or the schema cannot be created.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let connection = open_connection(&config.path, config.busy_timeout_ms)?;
        initialize_schema(&connection)?;
        Ok(Self { connection: Mutex::new(connection) })
    }

    /// Appends `event` for `run_id`, assigning it the next sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on serialization or write failure.
    pub fn append(&self, run_id: &RunId, event: &StatusEvent) -> Result<(), SqliteStoreError> {
        let payload = serde_json::to_string(event)?;
        let task_id = transition_task_id(event);
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::LockPoisoned)?;
        let seq: i64 = connection.query_row(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM events WHERE run_id = ?1",
            params![run_id.as_str()],
            |row| row.get(0),
        )?;
        connection.execute(
            "INSERT INTO events (run_id, seq, task_id, payload) VALUES (?1, ?2, ?3, ?4)",
            params![run_id.as_str(), seq, task_id, payload],
        )?;
        Ok(())
    }

    /// Replays every event recorded for `run_id`, in append order.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the query fails or a stored payload
    /// cannot be deserialized.
    pub fn load_events(&self, run_id: &RunId) -> Result<Vec<StatusEvent>, SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::LockPoisoned)?;
        let mut statement = connection
            .prepare("SELECT payload FROM events WHERE run_id = ?1 ORDER BY seq ASC")?;
        let rows = statement
            .query_map(params![run_id.as_str()], |row| row.get::<_, String>(0))?;
        let mut events = Vec::new();
        for row in rows {
            let payload = row?;
            events.push(serde_json::from_str(&payload)?);
        }
        Ok(events)
    }

    /// Replays `run_id`'s event log into the latest known state of every task.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] under the same conditions as [`Self::load_events`].
    pub fn load_task_states(&self, run_id: &RunId) -> Result<BTreeMap<TaskId, TaskState>, SqliteStoreError> {
        let mut states = BTreeMap::new();
        for event in self.load_events(run_id)? {
            if let StatusEvent::Transition { task_id, to, .. } = event {
                states.insert(task_id, to);
            }
        }
        Ok(states)
    }

    /// Returns every run identifier that has at least one recorded event.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the query fails.
    pub fn list_runs(&self) -> Result<Vec<RunId>, SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::LockPoisoned)?;
        let mut statement = connection.prepare("SELECT DISTINCT run_id FROM events ORDER BY run_id ASC")?;
        let rows = statement.query_map([], |row| row.get::<_, String>(0))?;
        let mut runs = Vec::new();
        for row in rows {
            runs.push(RunId::new(row?));
        }
        Ok(runs)
    }
}

/// A [`StatusSink`] bound to one Run, backed by a shared [`SqliteStatusStore`].
///
/// Holds an owned [`Arc`] rather than a borrow so it can be registered as a
/// `'static` sink (e.g. on an [`conduit_core::StatusSink`] trait object held
/// past the store's lexical scope, as the CLI does for `--state-dir`).
///
/// # Invariants
/// - Every event observed through this sink is appended under the same `run_id`.
pub struct RunScopedSink {
    store: Arc<SqliteStatusStore>,
    run_id: RunId,
}

impl SqliteStatusStore {
    /// Returns a [`StatusSink`] that appends every observed event under `run_id`.
    #[must_use]
    pub fn sink_for(self: &Arc<Self>, run_id: RunId) -> RunScopedSink {
        RunScopedSink { store: Arc::clone(self), run_id }
    }
}

impl StatusSink for RunScopedSink {
    fn observe(&self, event: &StatusEvent) -> Result<(), SinkError> {
        self.store.append(&self.run_id, event).map_err(|err| SinkError::DeliveryFailed(err.to_string()))
    }
}

fn transition_task_id(event: &StatusEvent) -> Option<String> {
    match event {
        StatusEvent::Transition { task_id, .. } => Some(task_id.as_str().to_string()),
        StatusEvent::PhaseAdvanced { .. } | StatusEvent::ArtifactPublished { .. } => None,
    }
}

fn open_connection(path: &Path, busy_timeout_ms: u64) -> Result<Connection, rusqlite::Error> {
    let connection = Connection::open(path)?;
    connection.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms))?;
    let _ = connection.pragma_update(None, "journal_mode", "WAL");
    Ok(connection)
}

fn initialize_schema(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id TEXT NOT NULL,
            seq INTEGER NOT NULL,
            task_id TEXT,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS events_run_seq ON events (run_id, seq);",
    )
}
