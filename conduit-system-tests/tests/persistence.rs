// conduit-system-tests/tests/persistence.rs
// ============================================================================
// Module: Persisted State Suite
// Description: Drives a Run through a SQLite-backed status sink and confirms
//              its event log replays into the same task states an in-memory
//              Run observes directly.
// Purpose: Exercise the optional durable-storage path config and the store
//          crate enable, end to end through the public engine surface.
// Dependencies: conduit-config, conduit-core, conduit-engine,
//               conduit-store-sqlite, conduit-transport, tokio
// ============================================================================

mod helpers;

use std::sync::Arc;

use conduit_config::OrchestrationConfig;
use conduit_config::StoreConfig;
use conduit_contract::SchemaRegistry;
use conduit_core::ids::RunId;
use conduit_core::ids::TaskId;
use conduit_core::FailureStrategy;
use conduit_core::ParallelStrategy;
use conduit_core::RunConfig;
use conduit_core::RunStatus;
use conduit_core::TaskState;
use conduit_engine::OrchestrationEngine;
use conduit_store_sqlite::SqliteStatusStore;
use conduit_store_sqlite::SqliteStoreConfig;
use conduit_transport::InProcessRegistry;
use helpers::echo_capability;
use helpers::plan;
use helpers::work_item;
use helpers::EchoHandler;
use serde_json::json;

fn run_config(run_id: &str) -> RunConfig {
    RunConfig {
        run_id: RunId::new(run_id),
        input: json!({}),
        parallel_strategy: ParallelStrategy::Max,
        failure_strategy: FailureStrategy::Continue,
        global_concurrency: 8,
    }
}

/// A config naming a SQLite backend parses and validates the way an operator's
/// `conduit.toml` would.
#[test]
fn sqlite_store_config_round_trips_through_toml() {
    let mut config = OrchestrationConfig::default();
    config.store = StoreConfig::Sqlite { path: "conduit.sqlite3".into() };
    let text = toml::to_string(&config).unwrap();
    let reloaded: OrchestrationConfig = toml::from_str(&text).unwrap();
    assert_eq!(reloaded.store, config.store);
    reloaded.validate().unwrap();
}

/// A Run's event log, once replayed from the SQLite store, reports the same
/// terminal task states the in-memory Run result reported.
#[tokio::test]
async fn replayed_event_log_matches_the_run_result() {
    let mut registry = SchemaRegistry::new();
    registry.register(echo_capability("echo")).unwrap();
    let mut in_process = InProcessRegistry::new();
    in_process.register("echo", Arc::new(EchoHandler));

    let document = plan(vec![
        work_item("a", "echo", json!({}), &[]),
        work_item("b", "echo", json!("$steps.a.output.echoed"), &["a"]),
    ]);

    let store = Arc::new(SqliteStatusStore::open(&SqliteStoreConfig::in_memory()).unwrap());
    let run_id = RunId::new("persisted-run");
    let sink = store.sink_for(run_id.clone());

    let engine = OrchestrationEngine::new(Arc::new(registry), Arc::new(in_process)).with_sink(Arc::new(sink));
    let cfg = run_config(run_id.as_str());
    let (_handle, future) = engine.run(&document, &cfg);
    let result = future.await.unwrap();
    assert_eq!(result.aggregation.status, RunStatus::Succeeded);

    let replayed = store.load_task_states(&run_id).unwrap();
    assert_eq!(replayed.get(&TaskId::new("a")), Some(&TaskState::Reported));
    assert_eq!(replayed.get(&TaskId::new("b")), Some(&TaskState::Reported));
}

/// Two runs recorded under distinct identifiers stay in separate event
/// streams; replaying one never pulls in the other's transitions.
#[tokio::test]
async fn distinct_run_ids_keep_separate_event_streams() {
    let mut registry = SchemaRegistry::new();
    registry.register(echo_capability("echo")).unwrap();
    let mut in_process = InProcessRegistry::new();
    in_process.register("echo", Arc::new(EchoHandler));
    let document = plan(vec![work_item("a", "echo", json!({}), &[])]);

    let registry = Arc::new(registry);
    let in_process = Arc::new(in_process);
    let store = Arc::new(SqliteStatusStore::open(&SqliteStoreConfig::in_memory()).unwrap());
    for run_id in ["run-a", "run-b"] {
        let sink = store.sink_for(RunId::new(run_id));
        let engine = OrchestrationEngine::new(Arc::clone(&registry), Arc::clone(&in_process)).with_sink(Arc::new(sink));
        let cfg = run_config(run_id);
        let (_handle, future) = engine.run(&document, &cfg);
        future.await.unwrap();
    }

    let runs = store.list_runs().unwrap();
    assert_eq!(runs, vec![RunId::new("run-a"), RunId::new("run-b")]);
    let run_a_states = store.load_task_states(&RunId::new("run-a")).unwrap();
    let run_b_states = store.load_task_states(&RunId::new("run-b")).unwrap();
    assert_eq!(run_a_states, run_b_states);
}
