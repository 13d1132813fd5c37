// crates/pagewatch-core/tests/orchestrator_unit.rs
// ============================================================================
// Module: Collection Orchestrator Unit Tests
// Description: Run sequencing, stage-tagged failures, partial-failure policy.
// Purpose: Validate the run state machine against in-memory backends.
// ============================================================================

//! ## Overview
//! Drives `run_collection` against in-memory doubles of every backend
//! interface: happy path, failures at each stage before persistence, and
//! the non-fatal publish failure after persistence.

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

use std::sync::Mutex;

use pagewatch_core::AuditResponse;
use pagewatch_core::CollectError;
use pagewatch_core::CollectionDeps;
use pagewatch_core::CommitInfo;
use pagewatch_core::CommitSource;
use pagewatch_core::MetricsRecord;
use pagewatch_core::MetricsStore;
use pagewatch_core::PerformanceProbe;
use pagewatch_core::ReportPublisher;
use pagewatch_core::RunStage;
use pagewatch_core::RunStatus;
use pagewatch_core::Strategy;
use pagewatch_core::run_collection;
use serde_json::json;

// ============================================================================
// SECTION: Test Doubles
// ============================================================================

const SHA: &str = "aa11bb22cc33dd44ee55ff667788990011223344";
const TARGET: &str = "https://example.test";

/// Commit source returning a fixed commit or a fixed error.
struct FixedCommits {
    result: Result<CommitInfo, CollectError>,
}

impl FixedCommits {
    fn ok() -> Self {
        let commit = CommitInfo::new(
            SHA,
            "Tune cache headers",
            "Avery",
            "2026-08-20T10:00:00Z",
            "https://example.test/commit",
        )
        .expect("commit");
        Self { result: Ok(commit) }
    }

    fn err(err: CollectError) -> Self {
        Self { result: Err(err) }
    }
}

impl CommitSource for FixedCommits {
    fn latest_commit(&self) -> Result<CommitInfo, CollectError> {
        self.result.clone()
    }
}

/// Probe returning per-strategy canned responses or errors.
struct CannedProbe {
    desktop: Result<AuditResponse, CollectError>,
    mobile: Result<AuditResponse, CollectError>,
}

impl CannedProbe {
    fn ok(desktop_score: f64, mobile_score: f64) -> Self {
        Self {
            desktop: Ok(audit_response(desktop_score)),
            mobile: Ok(audit_response(mobile_score)),
        }
    }
}

impl PerformanceProbe for CannedProbe {
    fn audit(&self, _target_url: &str, strategy: Strategy) -> Result<AuditResponse, CollectError> {
        match strategy {
            Strategy::Desktop => self.desktop.clone(),
            Strategy::Mobile => self.mobile.clone(),
        }
    }
}

/// Store capturing every put, optionally failing.
struct RecordingStore {
    records: Mutex<Vec<MetricsRecord>>,
    fail: bool,
}

impl RecordingStore {
    fn new() -> Self {
        Self { records: Mutex::new(Vec::new()), fail: false }
    }

    fn failing() -> Self {
        Self { records: Mutex::new(Vec::new()), fail: true }
    }

    fn taken(&self) -> Vec<MetricsRecord> {
        self.records.lock().expect("store lock").clone()
    }
}

impl MetricsStore for RecordingStore {
    fn put(&self, record: &MetricsRecord) -> Result<(), CollectError> {
        if self.fail {
            return Err(CollectError::StoreUnavailable("disk full".to_string()));
        }
        self.records.lock().expect("store lock").push(record.clone());
        Ok(())
    }

    fn scan_all(&self) -> Result<Vec<MetricsRecord>, CollectError> {
        Ok(self.taken())
    }
}

/// Publisher capturing publishes, optionally failing.
struct RecordingPublisher {
    published: Mutex<Vec<(String, String, String)>>,
    fail: bool,
}

impl RecordingPublisher {
    fn new(fail: bool) -> Self {
        Self { published: Mutex::new(Vec::new()), fail }
    }

    fn taken(&self) -> Vec<(String, String, String)> {
        self.published.lock().expect("publisher lock").clone()
    }
}

impl ReportPublisher for RecordingPublisher {
    fn publish(&self, path: &str, content: &str, message: &str) -> Result<(), CollectError> {
        if self.fail {
            return Err(CollectError::UpstreamRejected { status: 502 });
        }
        self.published
            .lock()
            .expect("publisher lock")
            .push((path.to_string(), content.to_string(), message.to_string()));
        Ok(())
    }
}

/// Builds a minimal valid audit response with the given performance score.
fn audit_response(performance_score: f64) -> AuditResponse {
    serde_json::from_value(json!({
        "lighthouseResult": {
            "categories": { "performance": { "score": performance_score } },
            "audits": {},
        }
    }))
    .expect("audit response")
}

// ============================================================================
// SECTION: Happy Path
// ============================================================================

#[test]
fn run_persists_record_and_publishes_report() {
    let commits = FixedCommits::ok();
    let probe = CannedProbe::ok(0.725, 0.560);
    let store = RecordingStore::new();
    let publisher = RecordingPublisher::new(false);
    let deps = CollectionDeps {
        commits: &commits,
        probe: &probe,
        store: &store,
        publisher: Some(&publisher),
    };

    let outcome = run_collection(TARGET, &deps).expect("run");
    assert_eq!(outcome.status, RunStatus::Success);
    assert_eq!(outcome.desktop_score, 72.5);
    assert_eq!(outcome.mobile_score, 56.0);
    assert_eq!(outcome.commit, "aa11bb2");
    assert!(outcome.report_published);

    let records = store.taken();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].average_score, 64.25);
    assert_eq!(records[0].target_url, TARGET);

    let published = publisher.taken();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, format!("reports/{SHA}.md"));
    assert!(published[0].1.contains("# PageSpeed Insights Report"));
    assert_eq!(published[0].2, "Add PageSpeed report for aa11bb2");
}

#[test]
fn raw_category_scores_scale_and_average_exactly() {
    let commits = FixedCommits::ok();
    let probe = CannedProbe::ok(0.873, 0.412);
    let store = RecordingStore::new();
    let deps =
        CollectionDeps { commits: &commits, probe: &probe, store: &store, publisher: None };

    let outcome = run_collection(TARGET, &deps).expect("run");
    assert_eq!(outcome.desktop_score, 87.3);
    assert_eq!(outcome.mobile_score, 41.2);
    assert_eq!(store.taken()[0].average_score, 64.25);
}

#[test]
fn run_without_publisher_skips_publishing() {
    let commits = FixedCommits::ok();
    let probe = CannedProbe::ok(0.9, 0.8);
    let store = RecordingStore::new();
    let deps =
        CollectionDeps { commits: &commits, probe: &probe, store: &store, publisher: None };

    let outcome = run_collection(TARGET, &deps).expect("run");
    assert!(!outcome.report_published);
    assert_eq!(store.taken().len(), 1);
}

// ============================================================================
// SECTION: Stage Failures
// ============================================================================

#[test]
fn commit_failure_aborts_before_any_probe() {
    let commits = FixedCommits::err(CollectError::UpstreamRejected { status: 503 });
    let probe = CannedProbe::ok(0.9, 0.8);
    let store = RecordingStore::new();
    let deps =
        CollectionDeps { commits: &commits, probe: &probe, store: &store, publisher: None };

    let err = run_collection(TARGET, &deps).unwrap_err();
    assert_eq!(err.stage, RunStage::FetchCommit);
    assert!(store.taken().is_empty());
}

#[test]
fn probe_failures_carry_the_failing_device_stage() {
    let commits = FixedCommits::ok();
    let store = RecordingStore::new();

    let probe = CannedProbe {
        desktop: Err(CollectError::Timeout),
        mobile: Ok(audit_response(0.8)),
    };
    let deps =
        CollectionDeps { commits: &commits, probe: &probe, store: &store, publisher: None };
    let err = run_collection(TARGET, &deps).unwrap_err();
    assert_eq!(err.stage, RunStage::ProbeDesktop);
    assert_eq!(err.cause, CollectError::Timeout);

    let probe = CannedProbe {
        desktop: Ok(audit_response(0.9)),
        mobile: Err(CollectError::UpstreamUnavailable("connection reset".to_string())),
    };
    let deps =
        CollectionDeps { commits: &commits, probe: &probe, store: &store, publisher: None };
    let err = run_collection(TARGET, &deps).unwrap_err();
    assert_eq!(err.stage, RunStage::ProbeMobile);
    assert!(store.taken().is_empty());
}

#[test]
fn malformed_probe_response_fails_at_extract() {
    let commits = FixedCommits::ok();
    let empty: AuditResponse = serde_json::from_value(json!({})).expect("empty response");
    let probe = CannedProbe { desktop: Ok(empty), mobile: Ok(audit_response(0.8)) };
    let store = RecordingStore::new();
    let deps =
        CollectionDeps { commits: &commits, probe: &probe, store: &store, publisher: None };

    let err = run_collection(TARGET, &deps).unwrap_err();
    assert_eq!(err.stage, RunStage::Extract);
    assert!(matches!(err.cause, CollectError::MalformedResponse(_)));
}

#[test]
fn store_failure_fails_the_run_without_publishing() {
    let commits = FixedCommits::ok();
    let probe = CannedProbe::ok(0.9, 0.8);
    let store = RecordingStore::failing();
    let publisher = RecordingPublisher::new(false);
    let deps = CollectionDeps {
        commits: &commits,
        probe: &probe,
        store: &store,
        publisher: Some(&publisher),
    };

    let err = run_collection(TARGET, &deps).unwrap_err();
    assert_eq!(err.stage, RunStage::Persist);
    assert!(publisher.taken().is_empty());
}

// ============================================================================
// SECTION: Partial-Failure Policy
// ============================================================================

#[test]
fn publish_failure_after_persist_still_succeeds() {
    let commits = FixedCommits::ok();
    let probe = CannedProbe::ok(0.9, 0.8);
    let store = RecordingStore::new();
    let publisher = RecordingPublisher::new(true);
    let deps = CollectionDeps {
        commits: &commits,
        probe: &probe,
        store: &store,
        publisher: Some(&publisher),
    };

    let outcome = run_collection(TARGET, &deps).expect("run succeeds despite publish failure");
    assert_eq!(outcome.status, RunStatus::Success);
    assert!(!outcome.report_published);
    assert_eq!(store.taken().len(), 1);
}
