// crates/pagewatch-core/src/lib.rs
// ============================================================================
// Module: Pagewatch Core
// Description: Data model, extraction pipeline, and orchestration for Pagewatch.
// Purpose: Provide backend-agnostic collection logic shared by all crates.
// Dependencies: serde, thiserror, time, tracing, hmac, sha2, hex
// ============================================================================

//! ## Overview
//! Pagewatch correlates web performance audits (Google PageSpeed Insights)
//! with source-control commits and persists the normalized results for
//! historical trending. This crate holds everything that is independent of a
//! concrete backend: the persisted data model, the typed audit-response
//! model, the metrics extractor, the report generator, webhook signature
//! verification, the error taxonomy, the backend interfaces, and the
//! collection orchestrator that sequences a single run.
//!
//! Invariants:
//! - Records are built exactly once per successful run and never mutated.
//! - Extraction never fails on missing optional audit fields; only missing
//!   required top-level structure is an error.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod errors;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::audit::AuditDetails;
pub use core::audit::AuditEntry;
pub use core::audit::AuditResponse;
pub use core::audit::CategoryScore;
pub use core::audit::LighthouseCategories;
pub use core::audit::LighthouseResult;
pub use core::extract::extract_metrics;
pub use core::model::CommitInfo;
pub use core::model::Diagnostic;
pub use core::model::DeviceMetrics;
pub use core::model::MAX_AUDIT_FINDINGS;
pub use core::model::METRICS_PARTITION;
pub use core::model::MetricsRecord;
pub use core::model::OptimizationOpportunity;
pub use core::model::SHORT_SHA_LEN;
pub use core::model::Strategy;
pub use core::model::build_record;
pub use core::model::run_timestamp;
pub use core::report::render_report;
pub use core::signature::signature_header;
pub use core::signature::verify_signature;
pub use errors::CollectError;
pub use errors::RunError;
pub use errors::RunStage;
pub use interfaces::CommitSource;
pub use interfaces::MetricsStore;
pub use interfaces::PerformanceProbe;
pub use interfaces::ReportPublisher;
pub use runtime::orchestrator::CollectionDeps;
pub use runtime::orchestrator::RunOutcome;
pub use runtime::orchestrator::RunStatus;
pub use runtime::orchestrator::run_collection;
