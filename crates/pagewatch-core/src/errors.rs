// crates/pagewatch-core/src/errors.rs
// ============================================================================
// Module: Pagewatch Error Taxonomy
// Description: Shared failure classification for collection and retrieval.
// Purpose: Give every stage a precise, loggable failure cause.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! One taxonomy covers every outbound dependency: upstream transport
//! failures, upstream rejections, timeouts, malformed trusted-shape
//! responses, store failures, contract violations, webhook signature
//! mismatches, and missing configuration. [`RunError`] pairs a cause with
//! the pipeline stage where it occurred so no failure is logged without
//! stage context.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Failure Causes
// ============================================================================

/// Failure causes shared by all Pagewatch components.
///
/// # Invariants
/// - Timeouts are classified as [`CollectError::Timeout`], never as
///   [`CollectError::UpstreamUnavailable`], so stage logs stay precise.
/// - Messages never embed credentials or raw response bodies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    /// Network, DNS, or connection failure reaching a remote service.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Non-success status returned by a remote service.
    #[error("upstream rejected request: status {status}")]
    UpstreamRejected {
        /// HTTP status code returned by the remote service.
        status: u16,
    },
    /// Bounded request deadline exceeded.
    #[error("upstream request timed out")]
    Timeout,
    /// Required field missing from a trusted-shape response.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
    /// Persistence-layer failure.
    #[error("metrics store unavailable: {0}")]
    StoreUnavailable(String),
    /// Programmer or data contract violation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Webhook signature verification failed.
    #[error("webhook signature invalid")]
    SignatureInvalid,
    /// Required configuration value absent.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),
}

// ============================================================================
// SECTION: Run Stages
// ============================================================================

/// Stages of the collection pipeline, in execution order.
///
/// # Invariants
/// - Labels are stable; they appear in logs and error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    /// Fetching head commit metadata from the source host.
    FetchCommit,
    /// Running the desktop performance probe.
    ProbeDesktop,
    /// Running the mobile performance probe.
    ProbeMobile,
    /// Normalizing raw audit responses into device metrics.
    Extract,
    /// Assembling the persisted record.
    BuildRecord,
    /// Writing the record to the metrics store.
    Persist,
    /// Rendering the human-readable report.
    GenerateReport,
    /// Side-publishing the rendered report.
    PublishReport,
}

impl RunStage {
    /// Returns a stable label for the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchCommit => "fetch_commit",
            Self::ProbeDesktop => "probe_desktop",
            Self::ProbeMobile => "probe_mobile",
            Self::Extract => "extract",
            Self::BuildRecord => "build_record",
            Self::Persist => "persist",
            Self::GenerateReport => "generate_report",
            Self::PublishReport => "publish_report",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Run Errors
// ============================================================================

/// A collection-run failure tagged with the stage where it occurred.
///
/// # Invariants
/// - Only stages at or before [`RunStage::Persist`] surface as [`RunError`];
///   report generation and publish failures are absorbed by the
///   orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("collection run failed at {stage}: {cause}")]
pub struct RunError {
    /// Pipeline stage where the failure occurred.
    pub stage: RunStage,
    /// Underlying failure cause.
    pub cause: CollectError,
}

impl RunError {
    /// Creates a stage-tagged run error.
    #[must_use]
    pub const fn new(stage: RunStage, cause: CollectError) -> Self {
        Self {
            stage,
            cause,
        }
    }
}
