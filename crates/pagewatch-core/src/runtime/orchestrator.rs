// crates/pagewatch-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Pagewatch Collection Orchestrator
// Description: Sequences one collection run end to end.
// Purpose: Apply the linear state machine and partial-failure policy.
// Dependencies: crate::core, crate::interfaces, crate::errors, tracing
// ============================================================================

//! ## Overview
//! A run is one logical unit of work: fetch the head commit, probe desktop
//! and mobile concurrently, extract both device metrics, build the record,
//! persist it, then optionally render and side-publish the report. Any
//! failure before persistence aborts the run with a stage-tagged
//! [`RunError`]; a publish failure is logged and the run still reports
//! success. No state is shared across runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;

use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::core::audit::AuditResponse;
use crate::core::extract::extract_metrics;
use crate::core::model::Strategy;
use crate::core::model::build_record;
use crate::core::model::run_timestamp;
use crate::core::report::render_report;
use crate::errors::CollectError;
use crate::errors::RunError;
use crate::errors::RunStage;
use crate::interfaces::CommitSource;
use crate::interfaces::MetricsStore;
use crate::interfaces::PerformanceProbe;
use crate::interfaces::ReportPublisher;

// ============================================================================
// SECTION: Run Inputs and Outputs
// ============================================================================

/// Backend dependencies injected into one collection run.
///
/// # Invariants
/// - `publisher` is `None` when no write-capable credential is configured;
///   report publishing is skipped entirely in that case.
pub struct CollectionDeps<'a> {
    /// Source of head-commit metadata.
    pub commits: &'a dyn CommitSource,
    /// Performance probe shared by both device invocations.
    pub probe: &'a dyn PerformanceProbe,
    /// Persistence for the assembled record.
    pub store: &'a dyn MetricsStore,
    /// Optional best-effort report publisher.
    pub publisher: Option<&'a dyn ReportPublisher>,
}

/// Terminal status of a completed run.
///
/// Failures never reach this type; they surface as [`RunError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The record was persisted; the run succeeded.
    Success,
}

/// Structured result of a successful collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Terminal run status.
    pub status: RunStatus,
    /// RFC 3339 timestamp identifying the persisted record.
    pub timestamp: String,
    /// Desktop performance score.
    pub desktop_score: f64,
    /// Mobile performance score.
    pub mobile_score: f64,
    /// Short identifier of the correlated commit.
    pub commit: String,
    /// Whether the report side-publish succeeded.
    pub report_published: bool,
}

// ============================================================================
// SECTION: Orchestration
// ============================================================================

/// Executes one collection run against the injected dependencies.
///
/// # Errors
///
/// Returns a stage-tagged [`RunError`] when any stage at or before
/// persistence fails. Report generation and publishing failures are logged
/// and absorbed; they never fail a persisted run.
pub fn run_collection(
    target_url: &str,
    deps: &CollectionDeps<'_>,
) -> Result<RunOutcome, RunError> {
    info!(target_url, "starting collection run");

    let commit = deps
        .commits
        .latest_commit()
        .map_err(|cause| RunError::new(RunStage::FetchCommit, cause))?;
    info!(commit = %commit.short_sha, "fetched head commit");

    let (desktop_raw, mobile_raw) = run_probes(deps.probe, target_url)?;

    let desktop = extract_metrics(&desktop_raw, Strategy::Desktop)
        .map_err(|cause| RunError::new(RunStage::Extract, cause))?;
    let mobile = extract_metrics(&mobile_raw, Strategy::Mobile)
        .map_err(|cause| RunError::new(RunStage::Extract, cause))?;

    let timestamp =
        run_timestamp().map_err(|cause| RunError::new(RunStage::BuildRecord, cause))?;
    let record = build_record(&timestamp, target_url, desktop, mobile, commit)
        .map_err(|cause| RunError::new(RunStage::BuildRecord, cause))?;

    deps.store
        .put(&record)
        .map_err(|cause| RunError::new(RunStage::Persist, cause))?;
    info!(sort_key = %record.sk, "persisted metrics record");

    let mut report_published = false;
    if let Some(publisher) = deps.publisher {
        let report = render_report(&record);
        let path = format!("reports/{}.md", record.commit.sha);
        let message = format!("Add PageSpeed report for {}", record.commit.short_sha);
        match publisher.publish(&path, &report, &message) {
            Ok(()) => {
                report_published = true;
                info!(path, "published report");
            }
            Err(cause) => {
                // Non-fatal: the record is already persisted.
                warn!(
                    stage = RunStage::PublishReport.as_str(),
                    error = %cause,
                    "report publish failed; run still succeeds"
                );
            }
        }
    }

    info!(
        desktop_score = record.desktop_score,
        mobile_score = record.mobile_score,
        "collection run complete"
    );
    Ok(RunOutcome {
        status: RunStatus::Success,
        timestamp: record.timestamp,
        desktop_score: record.desktop_score,
        mobile_score: record.mobile_score,
        commit: record.commit.short_sha,
        report_published,
    })
}

/// Runs both device probes concurrently and joins before extraction.
///
/// The desktop probe runs on a scoped thread while the mobile probe runs on
/// the calling thread; failure of either is fatal to the run.
fn run_probes(
    probe: &dyn PerformanceProbe,
    target_url: &str,
) -> Result<(AuditResponse, AuditResponse), RunError> {
    thread::scope(|scope| {
        let desktop_handle = scope.spawn(|| probe.audit(target_url, Strategy::Desktop));
        let mobile = probe.audit(target_url, Strategy::Mobile);
        let desktop = desktop_handle.join().map_err(|_| {
            RunError::new(
                RunStage::ProbeDesktop,
                CollectError::UpstreamUnavailable("desktop probe thread panicked".to_string()),
            )
        })?;
        let desktop =
            desktop.map_err(|cause| RunError::new(RunStage::ProbeDesktop, cause))?;
        let mobile = mobile.map_err(|cause| RunError::new(RunStage::ProbeMobile, cause))?;
        Ok((desktop, mobile))
    })
}
