// crates/pagewatch-server/src/webhook.rs
// ============================================================================
// Module: Webhook Endpoint
// Description: Signed push-event trigger for collection runs.
// Purpose: Gate externally triggered runs behind HMAC verification.
// Dependencies: axum, pagewatch-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Verification order is fixed: configuration presence, signature over the
//! raw body, JSON shape, event type, then branch. Only a signed push to the
//! monitored default branch spawns a run; everything else is acknowledged
//! without side effects. The run itself happens after the 202 is sent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use pagewatch_core::SHORT_SHA_LEN;
use pagewatch_core::verify_signature;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::app::AppState;
use crate::runner::run_once;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the HMAC signature of the raw body.
const SIGNATURE_HEADER: &str = "x-hub-signature-256";
/// Header carrying the event type.
const EVENT_HEADER: &str = "x-github-event";

// ============================================================================
// SECTION: Wire Shape
// ============================================================================

/// The subset of a push event the handler inspects.
#[derive(Debug, Deserialize)]
struct PushEvent {
    /// Fully qualified ref the push targeted.
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    /// Head commit sha after the push.
    after: Option<String>,
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Handles `POST /webhook`.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let Some(secret) = state.config.server.webhook_secret.as_deref().filter(|s| !s.is_empty())
    else {
        error!("webhook invoked without a configured secret");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Missing configuration" })),
        );
    };

    let signature = headers.get(SIGNATURE_HEADER).and_then(|value| value.to_str().ok());
    if verify_signature(secret, &body, signature).is_err() {
        warn!("webhook signature verification failed");
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "Invalid signature" })));
    }

    let Ok(event) = serde_json::from_slice::<PushEvent>(&body) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid JSON payload" })));
    };

    let event_type = headers.get(EVENT_HEADER).and_then(|value| value.to_str().ok());
    if event_type != Some("push") {
        return (StatusCode::OK, Json(json!({ "message": "Event type not supported" })));
    }

    let git_ref = event.git_ref.unwrap_or_default();
    if !git_ref.ends_with("/main") && !git_ref.ends_with("/master") {
        return (StatusCode::OK, Json(json!({ "message": "Not main/master branch" })));
    }

    let after = event.after.unwrap_or_default();
    let short_sha = after.get(.. SHORT_SHA_LEN).unwrap_or(&after).to_string();
    info!(git_ref, commit = %short_sha, "accepted push event; spawning collection run");

    let config = Arc::clone(&state.config);
    let store = Arc::clone(&state.store);
    tokio::spawn(async move {
        let _ = run_once(config, store).await;
    });

    (StatusCode::ACCEPTED, Json(json!({ "message": "Accepted", "commit": short_sha })))
}

#[cfg(test)]
mod tests;
