// crates/pagewatch-core/src/core/model.rs
// ============================================================================
// Module: Pagewatch Data Model
// Description: Commit metadata, device metrics, and the persisted record.
// Purpose: Define the immutable record written once per collection run.
// Dependencies: serde, time, crate::errors
// ============================================================================

//! ## Overview
//! A [`MetricsRecord`] is assembled exactly once per successful run from one
//! [`CommitInfo`] and two [`DeviceMetrics`] (desktop and mobile), keyed by a
//! constant partition marker plus an RFC 3339 sort key derived from
//! wall-clock time at creation. Records are never mutated after creation
//! and are retained indefinitely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::errors::CollectError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Constant partition marker under which every record is stored.
pub const METRICS_PARTITION: &str = "METRICS";
/// Length of the derived short commit identifier.
pub const SHORT_SHA_LEN: usize = 7;
/// Length of a full commit identifier.
const FULL_SHA_LEN: usize = 40;
/// Maximum truncated list length for opportunities and diagnostics.
pub const MAX_AUDIT_FINDINGS: usize = 5;

// ============================================================================
// SECTION: Device Strategy
// ============================================================================

/// Device profile a performance audit runs under.
///
/// # Invariants
/// - Labels match the probe API's `strategy` parameter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Desktop viewport and CPU profile.
    Desktop,
    /// Emulated mobile viewport and throttled CPU profile.
    Mobile,
}

impl Strategy {
    /// Returns the wire label for the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }
}

// ============================================================================
// SECTION: Commit Metadata
// ============================================================================

/// Commit metadata correlated with a collection run.
///
/// # Invariants
/// - `sha` is a 40-character hex string and is the immutable identity.
/// - `short_sha` is always the first seven characters of `sha`.
/// - `message` holds only the first line of the commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Full commit identifier (40 hex characters).
    pub sha: String,
    /// Derived short identifier (first seven characters of `sha`).
    pub short_sha: String,
    /// First line of the commit message.
    pub message: String,
    /// Commit author name.
    pub author: String,
    /// Commit authored timestamp as reported by the source host.
    pub authored_at: String,
    /// Browsable URL for the commit.
    pub url: String,
}

impl CommitInfo {
    /// Builds commit metadata, deriving `short_sha` and truncating the
    /// message to its first line.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::InvalidInput`] when `sha` is not a
    /// 40-character hex string.
    pub fn new(
        sha: &str,
        message: &str,
        author: &str,
        authored_at: &str,
        url: &str,
    ) -> Result<Self, CollectError> {
        if sha.len() != FULL_SHA_LEN || !sha.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(CollectError::InvalidInput(format!(
                "commit sha must be {FULL_SHA_LEN} hex characters"
            )));
        }
        let first_line = message.lines().next().unwrap_or_default();
        Ok(Self {
            sha: sha.to_string(),
            short_sha: sha[.. SHORT_SHA_LEN].to_string(),
            message: first_line.to_string(),
            author: author.to_string(),
            authored_at: authored_at.to_string(),
            url: url.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Audit Findings
// ============================================================================

/// An audit with a concrete, quantified potential time saving.
///
/// # Invariants
/// - Included in a record only when `savings_ms > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOpportunity {
    /// Audit identifier.
    pub id: String,
    /// Human-readable audit title.
    pub title: String,
    /// Human-readable audit description.
    pub description: String,
    /// Estimated savings in milliseconds, rounded to an integer.
    pub savings_ms: u64,
    /// Audit score as reported (0.0 when absent).
    pub score: f64,
}

/// An audit indicating a sub-optimal but unquantified condition.
///
/// # Invariants
/// - `score` is rounded to two decimals and is strictly below 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Audit identifier.
    pub id: String,
    /// Human-readable audit title.
    pub title: String,
    /// Human-readable audit description.
    pub description: String,
    /// Audit score in `[0.0, 1.0)`, rounded to two decimals.
    pub score: f64,
    /// Display string reported by the audit.
    pub display_value: String,
}

// ============================================================================
// SECTION: Device Metrics
// ============================================================================

/// Normalized metrics for one device profile.
///
/// # Invariants
/// - Category scores are in `[0.0, 100.0]` with one decimal place.
/// - Timing metrics are milliseconds and non-negative; `cls` is unitless.
/// - `opportunities` is sorted by non-increasing `savings_ms`, length <= 5.
/// - `diagnostics` is sorted by non-decreasing `score`, length <= 5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetrics {
    /// Device profile the audit ran under.
    pub strategy: Strategy,
    /// Performance category score (0-100, one decimal).
    pub performance_score: f64,
    /// Accessibility category score (0-100, one decimal).
    pub accessibility_score: f64,
    /// Best-practices category score (0-100, one decimal).
    pub best_practices_score: f64,
    /// SEO category score (0-100, one decimal).
    pub seo_score: f64,
    /// First Contentful Paint in milliseconds.
    pub fcp: f64,
    /// Largest Contentful Paint in milliseconds.
    pub lcp: f64,
    /// Total Blocking Time in milliseconds.
    pub tbt: f64,
    /// Time To Interactive in milliseconds.
    pub tti: f64,
    /// Speed Index in milliseconds.
    pub speed_index: f64,
    /// Cumulative Layout Shift (unitless).
    pub cls: f64,
    /// Top opportunities, sorted by descending potential savings.
    pub opportunities: Vec<OptimizationOpportunity>,
    /// Top diagnostics, sorted by ascending score (most problematic first).
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// SECTION: Persisted Record
// ============================================================================

/// The record persisted once per successful collection run.
///
/// # Invariants
/// - `pk` is always [`METRICS_PARTITION`]; `sk` equals `timestamp`.
/// - `sk` values derive from wall-clock time at creation and are the sole
///   chronological ordering key (descending = most recent first).
/// - `average_score` is the unweighted mean of the two performance scores.
/// - A record is either fully written or not written at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Constant partition marker.
    pub pk: String,
    /// RFC 3339 sort key, unique per run.
    pub sk: String,
    /// Run timestamp (identical to `sk`).
    pub timestamp: String,
    /// URL the audits ran against.
    #[serde(rename = "url")]
    pub target_url: String,
    /// Desktop device metrics.
    pub desktop: DeviceMetrics,
    /// Mobile device metrics.
    pub mobile: DeviceMetrics,
    /// Correlated commit metadata.
    pub commit: CommitInfo,
    /// Desktop performance score, duplicated for cheap querying.
    pub desktop_score: f64,
    /// Mobile performance score, duplicated for cheap querying.
    pub mobile_score: f64,
    /// Unweighted mean of the two performance scores.
    pub average_score: f64,
}

/// Returns the RFC 3339 UTC timestamp used as a record sort key.
///
/// Two runs starting within the same timestamp resolution produce the same
/// key; the resulting overwrite is accepted, not engineered around.
///
/// # Errors
///
/// Returns [`CollectError::InvalidInput`] when the current time cannot be
/// formatted (not expected in practice).
pub fn run_timestamp() -> Result<String, CollectError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| CollectError::InvalidInput(format!("timestamp formatting failed: {err}")))
}

/// Assembles the persisted record from one commit and both device metrics.
///
/// Pure function; performs no I/O.
///
/// # Errors
///
/// Returns [`CollectError::InvalidInput`] when the metrics carry the wrong
/// strategies or a performance score is outside `[0.0, 100.0]`.
pub fn build_record(
    timestamp: &str,
    target_url: &str,
    desktop: DeviceMetrics,
    mobile: DeviceMetrics,
    commit: CommitInfo,
) -> Result<MetricsRecord, CollectError> {
    if desktop.strategy != Strategy::Desktop || mobile.strategy != Strategy::Mobile {
        return Err(CollectError::InvalidInput(
            "device metrics carry mismatched strategies".to_string(),
        ));
    }
    for score in [desktop.performance_score, mobile.performance_score] {
        if !(0.0 ..= 100.0).contains(&score) {
            return Err(CollectError::InvalidInput(format!(
                "performance score out of range: {score}"
            )));
        }
    }
    let desktop_score = desktop.performance_score;
    let mobile_score = mobile.performance_score;
    Ok(MetricsRecord {
        pk: METRICS_PARTITION.to_string(),
        sk: timestamp.to_string(),
        timestamp: timestamp.to_string(),
        target_url: target_url.to_string(),
        desktop,
        mobile,
        commit,
        desktop_score,
        mobile_score,
        average_score: (desktop_score + mobile_score) / 2.0,
    })
}
