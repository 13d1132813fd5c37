// crates/pagewatch-server/src/app.rs
// ============================================================================
// Module: HTTP Application
// Description: Shared state and router assembly.
// Purpose: Wire the webhook, metrics, and health endpoints with CORS.
// Dependencies: axum, tower-http, pagewatch-store-sqlite
// ============================================================================

//! ## Overview
//! One router, three routes: `POST /webhook` (signed trigger),
//! `GET /metrics` (historical retrieval), and `GET /health` (liveness).
//! Retrieval responses allow any origin so dashboards can fetch directly
//! from the browser.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use pagewatch_store_sqlite::SqliteMetricsStore;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;

use crate::config::PagewatchConfig;
use crate::metrics_api::handle_health;
use crate::metrics_api::handle_metrics;
use crate::webhook::handle_webhook;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Validated runtime configuration.
    pub config: Arc<PagewatchConfig>,
    /// Shared metrics store.
    pub store: Arc<SqliteMetricsStore>,
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the application router over the shared state.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/metrics", get(handle_metrics))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}
