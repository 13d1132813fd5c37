// crates/pagewatch-core/tests/model_unit.rs
// ============================================================================
// Module: Data Model Unit Tests
// Description: Commit metadata derivation and record assembly.
// Purpose: Validate key derivation, score averaging, and input validation.
// ============================================================================

//! ## Overview
//! Exercises `CommitInfo::new` (sha validation, short-sha derivation,
//! first-line truncation) and `build_record` (keying, duplicated scores,
//! average, strategy and range validation).

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

use pagewatch_core::CollectError;
use pagewatch_core::CommitInfo;
use pagewatch_core::DeviceMetrics;
use pagewatch_core::METRICS_PARTITION;
use pagewatch_core::Strategy;
use pagewatch_core::build_record;
use pagewatch_core::run_timestamp;
use proptest::prelude::proptest;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

const SHA: &str = "aa11bb22cc33dd44ee55ff667788990011223344";

/// Commit fixture with a fixed, valid sha.
fn commit() -> CommitInfo {
    CommitInfo::new(SHA, "Tune cache headers", "Avery", "2026-08-20T10:00:00Z", "https://example.test/commit")
        .expect("commit")
}

/// Device metrics fixture with the given strategy and performance score.
fn metrics(strategy: Strategy, performance_score: f64) -> DeviceMetrics {
    DeviceMetrics {
        strategy,
        performance_score,
        accessibility_score: 90.0,
        best_practices_score: 80.0,
        seo_score: 70.0,
        fcp: 1000.0,
        lcp: 2000.0,
        tbt: 150.0,
        tti: 3000.0,
        speed_index: 2500.0,
        cls: 0.05,
        opportunities: Vec::new(),
        diagnostics: Vec::new(),
    }
}

// ============================================================================
// SECTION: Commit Metadata
// ============================================================================

#[test]
fn commit_info_derives_short_sha_and_first_line() {
    let info = CommitInfo::new(
        SHA,
        "Fix layout shift\n\nLonger body text here.",
        "Avery",
        "2026-08-20T10:00:00Z",
        "https://example.test/commit",
    )
    .expect("commit");
    assert_eq!(info.short_sha, "aa11bb2");
    assert_eq!(info.message, "Fix layout shift");
}

#[test]
fn commit_info_rejects_bad_sha() {
    for sha in ["abc123", "zz11bb22cc33dd44ee55ff667788990011223344", ""] {
        let err = CommitInfo::new(sha, "msg", "a", "t", "u").unwrap_err();
        assert!(matches!(err, CollectError::InvalidInput(_)), "sha {sha:?}");
    }
}

// ============================================================================
// SECTION: Record Assembly
// ============================================================================

#[test]
fn record_keys_and_scores_are_derived() {
    let record = build_record(
        "2026-08-20T10:30:00Z",
        "https://example.test",
        metrics(Strategy::Desktop, 72.5),
        metrics(Strategy::Mobile, 56.0),
        commit(),
    )
    .expect("record");
    assert_eq!(record.pk, METRICS_PARTITION);
    assert_eq!(record.sk, "2026-08-20T10:30:00Z");
    assert_eq!(record.timestamp, record.sk);
    assert_eq!(record.desktop_score, 72.5);
    assert_eq!(record.mobile_score, 56.0);
    assert_eq!(record.average_score, 64.25);
}

#[test]
fn record_serializes_url_field_name() {
    let record = build_record(
        "2026-08-20T10:30:00Z",
        "https://example.test",
        metrics(Strategy::Desktop, 90.0),
        metrics(Strategy::Mobile, 80.0),
        commit(),
    )
    .expect("record");
    let value = serde_json::to_value(&record).expect("json");
    assert_eq!(value["url"], "https://example.test");
    assert!(value.get("target_url").is_none());
}

#[test]
fn mismatched_strategies_are_rejected() {
    let err = build_record(
        "2026-08-20T10:30:00Z",
        "https://example.test",
        metrics(Strategy::Mobile, 90.0),
        metrics(Strategy::Mobile, 80.0),
        commit(),
    )
    .unwrap_err();
    assert!(matches!(err, CollectError::InvalidInput(_)));
}

#[test]
fn out_of_range_scores_are_rejected() {
    let err = build_record(
        "2026-08-20T10:30:00Z",
        "https://example.test",
        metrics(Strategy::Desktop, 100.5),
        metrics(Strategy::Mobile, 80.0),
        commit(),
    )
    .unwrap_err();
    assert!(matches!(err, CollectError::InvalidInput(_)));
}

proptest! {
    /// The average is exactly the unweighted mean for any in-range pair.
    #[test]
    fn average_is_exact_mean_for_all_score_pairs(
        desktop in 0.0 .. 100.0_f64,
        mobile in 0.0 .. 100.0_f64,
    ) {
        let record = build_record(
            "2026-08-20T10:30:00Z",
            "https://example.test",
            metrics(Strategy::Desktop, desktop),
            metrics(Strategy::Mobile, mobile),
            commit(),
        )
        .expect("record");
        assert_eq!(record.average_score, (desktop + mobile) / 2.0);
    }
}

// ============================================================================
// SECTION: Timestamps
// ============================================================================

#[test]
fn run_timestamp_is_rfc3339_utc() {
    let stamp = run_timestamp().expect("timestamp");
    assert!(stamp.ends_with('Z'), "expected UTC designator: {stamp}");
    assert!(stamp.len() >= "2026-08-20T10:30:00Z".len());
}
