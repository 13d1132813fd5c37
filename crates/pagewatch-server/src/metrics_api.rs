// crates/pagewatch-server/src/metrics_api.rs
// ============================================================================
// Module: Metrics Endpoint
// Description: Historical metrics retrieval and liveness probe.
// Purpose: Serve stored records most recent first with cache headers.
// Dependencies: axum, pagewatch-core, serde, serde_json
// ============================================================================

//! ## Overview
//! `GET /metrics` scans the full store off the async runtime, sorts
//! descending by timestamp, and projects each record down to the fields a
//! dashboard needs: the full commit metadata and the full per-device
//! metrics, minus the storage keys and derived aggregates. Store failures
//! return an opaque 500; nothing internal leaks past the log line.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use pagewatch_core::CommitInfo;
use pagewatch_core::DeviceMetrics;
use pagewatch_core::MetricsRecord;
use pagewatch_core::MetricsStore;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::app::AppState;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Cache policy applied to successful retrievals.
const CACHE_CONTROL_VALUE: &str = "max-age=300";

// ============================================================================
// SECTION: Projection
// ============================================================================

/// Per-record summary returned by the retrieval endpoint.
///
/// Carries the full commit metadata and the full per-device metrics,
/// including opportunities and diagnostics; only the storage keys and the
/// duplicated score aggregates are dropped.
#[derive(Debug, Serialize)]
struct MetricsSummary {
    /// Record timestamp (RFC 3339).
    timestamp: String,
    /// Commit the audits ran against.
    commit: CommitInfo,
    /// URL the audits ran against.
    url: String,
    /// Mobile audit metrics.
    mobile: DeviceMetrics,
    /// Desktop audit metrics.
    desktop: DeviceMetrics,
}

impl From<MetricsRecord> for MetricsSummary {
    fn from(record: MetricsRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            commit: record.commit,
            url: record.target_url,
            mobile: record.mobile,
            desktop: record.desktop,
        }
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `GET /metrics`.
pub async fn handle_metrics(State(state): State<AppState>) -> Response {
    let store = Arc::clone(&state.store);
    let scanned = tokio::task::spawn_blocking(move || store.scan_all()).await;
    let records = match scanned {
        Ok(Ok(records)) => records,
        Ok(Err(err)) => {
            error!(error = %err, "metrics scan failed");
            return retrieval_failure();
        }
        Err(_) => {
            error!("metrics scan task aborted");
            return retrieval_failure();
        }
    };

    let mut summaries: Vec<MetricsSummary> =
        records.into_iter().map(MetricsSummary::from).collect();
    summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let count = summaries.len();

    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, CACHE_CONTROL_VALUE)],
        Json(json!({ "metrics": summaries, "count": count })),
    )
        .into_response()
}

/// Handles `GET /health`.
pub async fn handle_health() -> &'static str {
    "ok"
}

/// Opaque failure response for the retrieval endpoint.
fn retrieval_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to retrieve metrics" })),
    )
        .into_response()
}
