// crates/pagewatch-server/src/runner.rs
// ============================================================================
// Module: Collection Runner
// Description: Bridges the synchronous collection pipeline into the server.
// Purpose: Construct per-run clients and execute runs off the async runtime.
// Dependencies: pagewatch-core, pagewatch-providers, pagewatch-store-sqlite
// ============================================================================

//! ## Overview
//! Clients are constructed fresh per run from configuration; only the store
//! is shared. The blocking pipeline runs on the `spawn_blocking` pool so
//! webhook handling and the scheduler never stall the async runtime. A
//! publisher that cannot be built (no token) downgrades the run to
//! collect-only instead of failing it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use pagewatch_core::CollectError;
use pagewatch_core::CollectionDeps;
use pagewatch_core::ReportPublisher;
use pagewatch_core::RunError;
use pagewatch_core::RunOutcome;
use pagewatch_core::RunStage;
use pagewatch_core::run_collection;
use pagewatch_providers::GithubClientConfig;
use pagewatch_providers::GithubCommitSource;
use pagewatch_providers::GithubReportPublisher;
use pagewatch_providers::PsiClientConfig;
use pagewatch_providers::PsiProbe;
use pagewatch_store_sqlite::SqliteMetricsStore;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::PagewatchConfig;

// ============================================================================
// SECTION: Blocking Execution
// ============================================================================

/// Builds the GitHub client configuration from server configuration.
fn github_config(config: &PagewatchConfig) -> GithubClientConfig {
    let mut client_config = GithubClientConfig {
        repo: config.github.repo.clone(),
        branch: config.github.branch.clone(),
        token: config.github.token.clone(),
        timeout_ms: config.github.timeout_ms,
        ..GithubClientConfig::default()
    };
    if let Some(api_base) = &config.github.api_base {
        client_config.api_base = api_base.clone();
    }
    client_config
}

/// Executes one collection run on the calling thread.
///
/// # Errors
///
/// Returns a stage-tagged [`RunError`] when the run fails at or before
/// persistence; client construction failures map to the stage the client
/// serves.
pub fn execute_run(
    config: &PagewatchConfig,
    store: &SqliteMetricsStore,
) -> Result<RunOutcome, RunError> {
    let commits = GithubCommitSource::new(github_config(config))
        .map_err(|cause| RunError::new(RunStage::FetchCommit, cause))?;

    let mut psi_config = PsiClientConfig {
        api_key: config.psi.api_key.clone(),
        timeout_ms: config.psi.timeout_ms,
        ..PsiClientConfig::default()
    };
    if let Some(endpoint) = &config.psi.endpoint {
        psi_config.endpoint = endpoint.clone();
    }
    let probe = PsiProbe::new(psi_config)
        .map_err(|cause| RunError::new(RunStage::ProbeDesktop, cause))?;

    // Collect-only when no write-capable token is available.
    let publisher = match GithubReportPublisher::new(github_config(config)) {
        Ok(publisher) => Some(publisher),
        Err(CollectError::ConfigurationMissing(_)) => {
            info!("no github token configured; report publishing disabled");
            None
        }
        Err(cause) => {
            warn!(error = %cause, "report publisher unavailable; continuing without it");
            None
        }
    };

    let deps = CollectionDeps {
        commits: &commits,
        probe: &probe,
        store,
        publisher: publisher.as_ref().map(|publisher| publisher as &dyn ReportPublisher),
    };
    run_collection(&config.target_url, &deps)
}

// ============================================================================
// SECTION: Async Bridging
// ============================================================================

/// Runs one collection on the blocking pool and logs the outcome.
///
/// # Errors
///
/// Returns the run's stage-tagged [`RunError`]; an aborted blocking task is
/// reported as an unavailable upstream at the first stage.
pub async fn run_once(
    config: Arc<PagewatchConfig>,
    store: Arc<SqliteMetricsStore>,
) -> Result<RunOutcome, RunError> {
    let result = tokio::task::spawn_blocking(move || execute_run(&config, &store))
        .await
        .map_err(|_| {
            RunError::new(
                RunStage::FetchCommit,
                CollectError::UpstreamUnavailable("collection task aborted".to_string()),
            )
        })?;
    match &result {
        Ok(outcome) => info!(
            timestamp = %outcome.timestamp,
            commit = %outcome.commit,
            report_published = outcome.report_published,
            "collection run succeeded"
        ),
        Err(err) => error!(stage = %err.stage, error = %err.cause, "collection run failed"),
    }
    result
}

/// Periodically triggers collection runs until the process exits.
pub async fn collection_loop(
    config: Arc<PagewatchConfig>,
    store: Arc<SqliteMetricsStore>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    // The first tick fires immediately; skip it so startup stays quiet.
    interval.tick().await;
    loop {
        interval.tick().await;
        let _ = run_once(Arc::clone(&config), Arc::clone(&store)).await;
    }
}
