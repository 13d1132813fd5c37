// crates/pagewatch-server/src/main.rs
// ============================================================================
// Module: Pagewatch Server Binary
// Description: CLI entry point for one-shot collection and the HTTP server.
// Purpose: Dispatch `collect` and `serve` over validated configuration.
// Dependencies: clap, tokio, axum, tracing-subscriber, pagewatch crates
// ============================================================================

//! ## Overview
//! Two commands: `collect` runs one collection and prints the outcome as
//! JSON; `serve` binds the HTTP surface (webhook trigger, metrics
//! retrieval, health) and optionally a background collection loop. Both
//! load the same TOML configuration with environment secret overrides.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::AppState;
use crate::app::build_router;
use crate::config::PagewatchConfig;
use crate::runner::collection_loop;
use crate::runner::run_once;

mod app;
mod config;
mod metrics_api;
mod runner;
mod webhook;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Pagewatch: PageSpeed Insights collection correlated with commits.
#[derive(Parser, Debug)]
#[command(name = "pagewatch", version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Command to run.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one collection and print the outcome.
    Collect,
    /// Serve the HTTP surface and optional background scheduler.
    Serve,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal CLI error carrying a printable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Initializes the tracing subscriber from the environment filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = PagewatchConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let store = pagewatch_store_sqlite::SqliteMetricsStore::new(
        pagewatch_store_sqlite::SqliteMetricsStoreConfig::for_path(&config.store.path),
    )
    .map_err(|err| CliError::new(err.to_string()))?;
    let config = Arc::new(config);
    let store = Arc::new(store);

    match cli.command {
        Commands::Collect => command_collect(config, store).await,
        Commands::Serve => command_serve(config, store).await,
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Runs one collection and prints the outcome as JSON.
async fn command_collect(
    config: Arc<PagewatchConfig>,
    store: Arc<pagewatch_store_sqlite::SqliteMetricsStore>,
) -> CliResult<ExitCode> {
    let outcome =
        run_once(config, store).await.map_err(|err| CliError::new(err.to_string()))?;
    let rendered = serde_json::to_string_pretty(&outcome)
        .map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Serves the HTTP surface until the process is stopped.
async fn command_serve(
    config: Arc<PagewatchConfig>,
    store: Arc<pagewatch_store_sqlite::SqliteMetricsStore>,
) -> CliResult<ExitCode> {
    let state = AppState {
        config: Arc::clone(&config),
        store: Arc::clone(&store),
    };

    if let Some(interval_secs) = config.server.collect_interval_secs {
        info!(interval_secs, "starting background collection loop");
        tokio::spawn(collection_loop(Arc::clone(&config), Arc::clone(&store), interval_secs));
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .map_err(|err| CliError::new(format!("bind {}: {err}", config.server.bind_addr)))?;
    info!(addr = %config.server.bind_addr, "serving http");
    axum::serve(listener, app)
        .await
        .map_err(|err| CliError::new(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
