// crates/pagewatch-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Metrics Store Tests
// Description: Upsert, ordering, pagination, and reopen behavior.
// Purpose: Validate the MetricsStore contract against a real database file.
// ============================================================================

//! ## Overview
//! Exercises the store through the core interface: empty scans, ascending
//! sort-key ordering across multiple keyset pages, same-key overwrite, and
//! persistence across a close-and-reopen cycle.

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

use std::path::Path;

use pagewatch_core::CommitInfo;
use pagewatch_core::DeviceMetrics;
use pagewatch_core::MetricsRecord;
use pagewatch_core::MetricsStore;
use pagewatch_core::Strategy;
use pagewatch_core::build_record;
use pagewatch_store_sqlite::SqliteMetricsStore;
use pagewatch_store_sqlite::SqliteMetricsStoreConfig;
use tempfile::TempDir;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Opens a store with a small page size to force multi-page scans.
fn open_store(path: &Path, scan_page_size: u32) -> SqliteMetricsStore {
    SqliteMetricsStore::new(SqliteMetricsStoreConfig {
        scan_page_size,
        ..SqliteMetricsStoreConfig::for_path(path)
    })
    .expect("open store")
}

/// Device metrics fixture.
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

/// Record fixture keyed by the given timestamp.
fn record(timestamp: &str, desktop_score: f64) -> MetricsRecord {
    let commit = CommitInfo::new(
        "aa11bb22cc33dd44ee55ff667788990011223344",
        "Tune cache headers",
        "Avery",
        "2026-08-20T10:00:00Z",
        "https://example.test/commit",
    )
    .expect("commit");
    build_record(
        timestamp,
        "https://example.test",
        metrics(Strategy::Desktop, desktop_score),
        metrics(Strategy::Mobile, 50.0),
        commit,
    )
    .expect("record")
}

// ============================================================================
// SECTION: Scanning
// ============================================================================

#[test]
fn empty_store_scans_to_empty() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir.path().join("metrics.db"), 100);
    assert!(store.scan_all().expect("scan").is_empty());
}

#[test]
fn scan_returns_ascending_sort_keys_across_pages() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir.path().join("metrics.db"), 2);

    // Inserted out of order; the scan must come back sorted.
    for hour in [14, 10, 12, 16, 11, 15, 13] {
        let timestamp = format!("2026-08-20T{hour:02}:00:00Z");
        store.put(&record(&timestamp, 80.0)).expect("put");
    }

    let records = store.scan_all().expect("scan");
    let keys: Vec<&str> = records.iter().map(|rec| rec.sk.as_str()).collect();
    assert_eq!(keys.len(), 7);
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
    assert_eq!(keys[0], "2026-08-20T10:00:00Z");
    assert_eq!(keys[6], "2026-08-20T16:00:00Z");
}

#[test]
fn scan_page_size_does_not_change_results() {
    let dir = TempDir::new().expect("tempdir");
    let wide = open_store(&dir.path().join("metrics.db"), 100);
    for hour in 10 .. 15 {
        let timestamp = format!("2026-08-20T{hour:02}:00:00Z");
        wide.put(&record(&timestamp, 80.0)).expect("put");
    }
    let narrow = open_store(&dir.path().join("metrics.db"), 1);
    assert_eq!(wide.scan_all().expect("scan"), narrow.scan_all().expect("scan"));
}

// ============================================================================
// SECTION: Upserts
// ============================================================================

#[test]
fn same_sort_key_overwrites() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir.path().join("metrics.db"), 100);

    store.put(&record("2026-08-20T10:00:00Z", 70.0)).expect("put");
    store.put(&record("2026-08-20T10:00:00Z", 95.0)).expect("put");

    let records = store.scan_all().expect("scan");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].desktop_score, 95.0);
}

#[test]
fn records_round_trip_fully() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir.path().join("metrics.db"), 100);

    let original = record("2026-08-20T10:00:00Z", 72.5);
    store.put(&original).expect("put");
    let records = store.scan_all().expect("scan");
    assert_eq!(records, vec![original]);
}

// ============================================================================
// SECTION: Durability
// ============================================================================

#[test]
fn records_survive_reopen() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("metrics.db");
    {
        let store = open_store(&path, 100);
        store.put(&record("2026-08-20T10:00:00Z", 80.0)).expect("put");
    }
    let reopened = open_store(&path, 100);
    assert_eq!(reopened.scan_all().expect("scan").len(), 1);
}
