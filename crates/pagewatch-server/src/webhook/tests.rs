// crates/pagewatch-server/src/webhook/tests.rs
// ============================================================================
// Module: Webhook Endpoint Tests
// Description: Gate ordering, status codes, and response bodies.
// Purpose: Validate every webhook verification branch over the router.
// ============================================================================

//! ## Overview
//! Drives `POST /webhook` through the assembled router with a real signed
//! body: missing configuration, signature mismatch, malformed JSON,
//! non-push events, non-default branches, and the accepted path.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use http_body_util::BodyExt;
use pagewatch_core::signature_header;
use pagewatch_store_sqlite::SqliteMetricsStore;
use pagewatch_store_sqlite::SqliteMetricsStoreConfig;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::app::AppState;
use crate::app::build_router;
use crate::config::GithubSection;
use crate::config::PagewatchConfig;
use crate::config::PsiSection;
use crate::config::ServerSection;
use crate::config::StoreSection;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

const SECRET: &str = "webhook-test-secret";

/// Builds a router over a fresh store; `secret` controls the webhook gate.
/// The GitHub base points at a closed local port so any spawned run fails
/// fast without touching the network.
fn test_router(dir: &TempDir, secret: Option<&str>) -> Router {
    let store_path = dir.path().join("metrics.db");
    let config = PagewatchConfig {
        target_url: "https://example.test".to_string(),
        github: GithubSection {
            repo: "acme/site".to_string(),
            branch: "main".to_string(),
            timeout_ms: 10_000,
            token: None,
            api_base: Some("http://127.0.0.1:1".to_string()),
        },
        psi: PsiSection::default(),
        store: StoreSection {
            path: store_path.clone(),
        },
        server: ServerSection {
            bind_addr: "127.0.0.1:0".to_string(),
            webhook_secret: secret.map(str::to_string),
            collect_interval_secs: None,
        },
    };
    let store =
        SqliteMetricsStore::new(SqliteMetricsStoreConfig::for_path(&store_path)).expect("store");
    build_router(AppState {
        config: Arc::new(config),
        store: Arc::new(store),
    })
}

/// Builds a signed webhook request with the given event type and body.
fn signed_request(event_type: &str, body: &str) -> Request<Body> {
    let signature = signature_header(SECRET, body.as_bytes());
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header("x-github-event", event_type)
        .header("x-hub-signature-256", signature)
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Sends a request and returns status plus parsed JSON body.
async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    (status, body)
}

/// A push payload for the given fully qualified ref.
fn push_body(git_ref: &str) -> String {
    format!(
        r#"{{"ref":"{git_ref}","after":"aa11bb22cc33dd44ee55ff667788990011223344"}}"#
    )
}

// ============================================================================
// SECTION: Configuration and Signature Gates
// ============================================================================

#[tokio::test]
async fn missing_secret_is_a_server_error() {
    let dir = TempDir::new().expect("tempdir");
    let router = test_router(&dir, None);
    let (status, body) = send(router, signed_request("push", &push_body("refs/heads/main"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Missing configuration");
}

#[tokio::test]
async fn missing_signature_is_forbidden() {
    let dir = TempDir::new().expect("tempdir");
    let router = test_router(&dir, Some(SECRET));
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("x-github-event", "push")
        .body(Body::from(push_body("refs/heads/main")))
        .expect("request");
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid signature");
}

#[tokio::test]
async fn wrong_signature_is_forbidden() {
    let dir = TempDir::new().expect("tempdir");
    let router = test_router(&dir, Some(SECRET));
    let body_text = push_body("refs/heads/main");
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("x-github-event", "push")
        .header("x-hub-signature-256", signature_header("other-secret", body_text.as_bytes()))
        .body(Body::from(body_text))
        .expect("request");
    let (status, _) = send(router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// SECTION: Payload Gates
// ============================================================================

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let dir = TempDir::new().expect("tempdir");
    let router = test_router(&dir, Some(SECRET));
    let (status, body) = send(router, signed_request("push", "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON payload");
}

#[tokio::test]
async fn non_push_event_is_acknowledged_without_a_run() {
    let dir = TempDir::new().expect("tempdir");
    let router = test_router(&dir, Some(SECRET));
    let (status, body) = send(router, signed_request("ping", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event type not supported");
}

#[tokio::test]
async fn non_default_branch_push_is_acknowledged_without_a_run() {
    for git_ref in ["refs/heads/develop", "refs/heads/feature/x"] {
        let dir = TempDir::new().expect("tempdir");
        let router = test_router(&dir, Some(SECRET));
        let (status, body) = send(router, signed_request("push", &push_body(git_ref))).await;
        assert_eq!(status, StatusCode::OK, "ref {git_ref}");
        assert_eq!(body["message"], "Not main/master branch");
    }
}

// ============================================================================
// SECTION: Accepted Pushes
// ============================================================================

#[tokio::test]
async fn main_push_is_accepted_with_short_commit() {
    let dir = TempDir::new().expect("tempdir");
    let router = test_router(&dir, Some(SECRET));
    let (status, body) =
        send(router, signed_request("push", &push_body("refs/heads/main"))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["message"], "Accepted");
    assert_eq!(body["commit"], "aa11bb2");
}

#[tokio::test]
async fn master_push_is_accepted() {
    let dir = TempDir::new().expect("tempdir");
    let router = test_router(&dir, Some(SECRET));
    let (status, _) =
        send(router, signed_request("push", &push_body("refs/heads/master"))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}
