// crates/conduit-cli/src/main.rs
// ============================================================================
// Module: Conduit CLI Entry Point
// Description: Command dispatcher that loads a plan and capability catalog,
//              runs the Orchestration Engine, and prints the aggregated result.
// Purpose: Exercise the execution substrate end to end from the command line.
// Dependencies: clap, conduit-config, conduit-contract, conduit-core,
//               conduit-engine, conduit-status, conduit-store-sqlite, tokio.
// ============================================================================

//! ## Overview
//! The `conduit` binary wires [`conduit_config::OrchestrationConfig`] and a
//! capability catalog into one [`conduit_engine::OrchestrationEngine`] call.
//! `run` executes a plan to completion and prints its aggregated result;
//! `validate` extracts a plan against a catalog without invoking any worker,
//! for catching unknown capabilities and dependency cycles before a Run
//! starts.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use conduit_config::OrchestrationConfig;
use conduit_config::StoreConfig;
use conduit_contract::SchemaRegistry;
use conduit_core::ids::GateId;
use conduit_core::ids::RunId;
use conduit_core::Capability;
use conduit_core::FailureStrategy;
use conduit_core::ParallelStrategy;
use conduit_core::RunConfig;
use conduit_core::RunStatus;
use conduit_core::TaskState;
use conduit_engine::OrchestrationEngine;
use conduit_engine::extractor::PlanDocument;
use conduit_engine::gate::GateWeights;
use conduit_store_sqlite::SqliteStoreConfig;
use conduit_transport::InProcessRegistry;
use serde_json::Value;
use thiserror::Error;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "conduit", disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Executes a plan to completion and prints the aggregated result.
    Run(RunArgs),
    /// Extracts a plan against a capability catalog without invoking any worker.
    Validate(ValidateArgs),
}

/// Shared arguments for loading a plan and its capability catalog.
#[derive(clap::Args, Debug)]
struct CatalogArgs {
    /// Path to the plan document (JSON).
    #[arg(long, value_name = "PATH")]
    plan: PathBuf,
    /// Path to the capability catalog (JSON array of capabilities).
    #[arg(long, value_name = "PATH")]
    capabilities: PathBuf,
    /// Path to an orchestration config file (TOML). Uses compiled-in
    /// defaults when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the `run` command.
#[derive(clap::Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    /// The run-wide input bag substituted into `$input.*` references (JSON).
    #[arg(long, value_name = "JSON", default_value = "{}")]
    input: String,
    /// Directory for a durable SQLite event log, overriding the config's
    /// `store` backend.
    #[arg(long, value_name = "DIR")]
    state_dir: Option<PathBuf>,
    /// Stable identifier for this Run, used as the SQLite store's run key.
    #[arg(long, value_name = "ID", default_value = "run")]
    run_id: String,
}

/// Arguments for the `validate` command.
#[derive(clap::Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
}

/// CLI error wrapper unifying every failure domain into one reportable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Writes a line to standard output without going through the banned
/// `println!` family.
fn write_stdout_line(line: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}").map_err(|err| CliError::new(format!("writing stdout: {err}")))
}

/// Writes a line to standard error without going through the banned
/// `eprintln!` family.
fn write_stderr_line(line: &str) -> CliResult<()> {
    let mut stderr = std::io::stderr().lock();
    writeln!(stderr, "{line}").map_err(|err| CliError::new(format!("writing stderr: {err}")))
}

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            let _ = write_stderr_line(&format!("error: {err}"));
            ExitCode::FAILURE
        }
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => command_run(args).await,
        Commands::Validate(args) => command_validate(args).await,
    }
}

/// Loads the plan document, capability catalog, and config named by `args`.
fn load_catalog(args: &CatalogArgs) -> CliResult<(PlanDocument, SchemaRegistry, OrchestrationConfig)> {
    let config = OrchestrationConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("loading config: {err}")))?;

    let plan_bytes = std::fs::read(&args.plan)
        .map_err(|err| CliError::new(format!("reading plan {}: {err}", args.plan.display())))?;
    let plan_value: Value = serde_json::from_slice(&plan_bytes)
        .map_err(|err| CliError::new(format!("parsing plan {}: {err}", args.plan.display())))?;
    let plan = PlanDocument::from_json(&plan_value).map_err(|err| CliError::new(format!("extracting plan: {err}")))?;

    let registry = load_registry(&args.capabilities)?;

    Ok((plan, registry, config))
}

/// Loads a capability catalog file into a [`SchemaRegistry`].
fn load_registry(path: &Path) -> CliResult<SchemaRegistry> {
    let bytes =
        std::fs::read(path).map_err(|err| CliError::new(format!("reading capabilities {}: {err}", path.display())))?;
    let capabilities: Vec<Capability> = serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("parsing capabilities {}: {err}", path.display())))?;
    let mut registry = SchemaRegistry::new();
    for capability in capabilities {
        registry.register(capability).map_err(|err| CliError::new(format!("registering capability: {err}")))?;
    }
    Ok(registry)
}

/// Converts a config's gate weight overrides into the engine's native map.
fn gate_weights_from(config: &OrchestrationConfig) -> GateWeights {
    let mut weights = GateWeights::new();
    for gate in [GateId::Schema, GateId::Syntax, GateId::Dependency, GateId::Security, GateId::Testing] {
        weights.insert(gate, config.gate_weights.weight_for(gate));
    }
    weights
}

async fn command_validate(args: ValidateArgs) -> CliResult<ExitCode> {
    let (plan, registry, _config) = load_catalog(&args.catalog)?;
    match conduit_engine::extractor::TaskExtractor::new().extract(&plan, &registry) {
        Ok((tasks, graph)) => {
            write_stdout_line(&format!(
                "plan is valid: {} task(s), {} phase(s)",
                tasks.len(),
                graph.max_phase().map_or(0, |phase| phase.get() + 1)
            ))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            write_stderr_line(&format!("plan is invalid: {err}"))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn command_run(args: RunArgs) -> CliResult<ExitCode> {
    let (plan, registry, config) = load_catalog(&args.catalog)?;
    let input: Value =
        serde_json::from_str(&args.input).map_err(|err| CliError::new(format!("parsing --input: {err}")))?;

    let in_process = InProcessRegistry::new();
    let mut engine = OrchestrationEngine::new(Arc::new(registry), Arc::new(in_process))
        .with_gate_weights(gate_weights_from(&config))
        .with_resource_class_limits(BTreeMap::new())
        .with_sink(Arc::new(conduit_status::LogSink::new(std::io::stderr())));

    let store_config = args.state_dir.as_ref().map(|dir| StoreConfig::Sqlite { path: dir.join("conduit.sqlite3") });
    let sink_store = match store_config.unwrap_or_else(|| config.store.clone()) {
        StoreConfig::Sqlite { path } => {
            let store = conduit_store_sqlite::SqliteStatusStore::open(&SqliteStoreConfig::new(path))
                .map_err(|err| CliError::new(format!("opening state store: {err}")))?;
            Some(Arc::new(store))
        }
        StoreConfig::None => None,
    };
    let run_id = RunId::new(args.run_id);
    if let Some(store) = &sink_store {
        engine = engine.with_sink(Arc::new(store.sink_for(run_id.clone())));
    }

    let run_config = RunConfig {
        run_id,
        input,
        parallel_strategy: ParallelStrategy::Max,
        failure_strategy: FailureStrategy::Continue,
        global_concurrency: config.global_concurrency,
    };

    let (_handle, future) = engine.run(&plan, &run_config);
    let result = future.await.map_err(|err| CliError::new(format!("running plan: {err}")))?;
    let status = result.aggregation.status;
    print_result(&result)?;

    Ok(exit_code_for(status))
}

fn print_result(result: &conduit_engine::RunResult) -> CliResult<()> {
    write_stdout_line(&format!("status: {}", run_status_label(result.aggregation.status)))?;
    write_stdout_line(&format!("halted: {}", result.halted))?;
    for summary in &result.aggregation.task_summaries {
        let quality = summary.quality_score.map_or_else(|| "-".to_string(), |score| score.to_string());
        write_stdout_line(&format!(
            "  task={} state={} attempts={} quality={}",
            summary.task_id,
            task_state_label(summary.final_state),
            summary.attempts,
            quality
        ))?;
    }
    write_stdout_line(&format!("artifacts: {}", result.aggregation.artifacts.len()))
}

const fn run_status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Pending => "pending",
        RunStatus::Running => "running",
        RunStatus::Succeeded => "succeeded",
        RunStatus::Failed => "failed",
        RunStatus::Partial => "partial",
    }
}

const fn task_state_label(state: TaskState) -> &'static str {
    match state {
        TaskState::Pending => "pending",
        TaskState::Scheduled => "scheduled",
        TaskState::Ready => "ready",
        TaskState::Running => "running",
        TaskState::Succeeded => "succeeded",
        TaskState::Failed => "failed",
        TaskState::Retrying => "retrying",
        TaskState::Skipped => "skipped",
        TaskState::Cancelled => "cancelled",
        TaskState::Validated => "validated",
        TaskState::Reported => "reported",
    }
}

const fn exit_code_for(status: RunStatus) -> ExitCode {
    match status {
        RunStatus::Succeeded => ExitCode::SUCCESS,
        RunStatus::Pending | RunStatus::Running | RunStatus::Failed | RunStatus::Partial => ExitCode::FAILURE,
    }
}
