// crates/pagewatch-core/src/interfaces/mod.rs
// ============================================================================
// Module: Pagewatch Interfaces
// Description: Backend-agnostic interfaces for commits, probes, storage, publish.
// Purpose: Define the contract surfaces the orchestrator sequences.
// Dependencies: crate::core, crate::errors
// ============================================================================

//! ## Overview
//! Interfaces define how Pagewatch reaches external systems without
//! embedding backend details. Clients are constructed explicitly per run or
//! injected, which keeps every seam replaceable by a test double.
//! Implementations apply bounded timeouts; exceeding one is reported as
//! [`CollectError::Timeout`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::audit::AuditResponse;
use crate::core::model::CommitInfo;
use crate::core::model::MetricsRecord;
use crate::core::model::Strategy;
use crate::errors::CollectError;

// ============================================================================
// SECTION: Commit Source
// ============================================================================

/// Read-only source of head-commit metadata for the monitored repository.
pub trait CommitSource: Send + Sync {
    /// Fetches metadata for the head of the designated branch.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::UpstreamUnavailable`] on transport failure,
    /// [`CollectError::UpstreamRejected`] on a non-success status,
    /// [`CollectError::Timeout`] past the bounded deadline, and
    /// [`CollectError::MalformedResponse`] when required fields are absent.
    fn latest_commit(&self) -> Result<CommitInfo, CollectError>;
}

// ============================================================================
// SECTION: Performance Probe
// ============================================================================

/// Runs a performance audit against a target URL for one device profile.
///
/// # Invariants
/// - Invocations for different strategies are independent and may run
///   concurrently; implementations hold no shared mutable state.
pub trait PerformanceProbe: Send + Sync {
    /// Runs the audit and returns the raw response document.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::UpstreamUnavailable`],
    /// [`CollectError::UpstreamRejected`], [`CollectError::Timeout`], or
    /// [`CollectError::MalformedResponse`] mirroring [`CommitSource`].
    fn audit(&self, target_url: &str, strategy: Strategy) -> Result<AuditResponse, CollectError>;
}

// ============================================================================
// SECTION: Metrics Store
// ============================================================================

/// Narrow key-value/document interface over the persistence engine.
pub trait MetricsStore: Send + Sync {
    /// Unconditionally upserts a record keyed by `(pk, sk)`.
    ///
    /// The write is a single atomic put: a record is either fully written
    /// or not written at all.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::StoreUnavailable`] on persistence failure;
    /// this is fatal to the collection run.
    fn put(&self, record: &MetricsRecord) -> Result<(), CollectError>;

    /// Returns every record, paginating transparently until exhausted.
    ///
    /// Records come back ascending by sort key (the underlying store's
    /// order); callers re-sort descending for most-recent-first views.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::StoreUnavailable`] on persistence failure;
    /// this is fatal to the retrieval endpoint only.
    fn scan_all(&self) -> Result<Vec<MetricsRecord>, CollectError>;
}

// ============================================================================
// SECTION: Report Publisher
// ============================================================================

/// Best-effort side-publish of a rendered report to a content host.
pub trait ReportPublisher: Send + Sync {
    /// Creates or updates the file at `path` on the publish branch.
    ///
    /// Failures here are explicitly non-fatal to the collection run; the
    /// orchestrator logs and continues.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::UpstreamUnavailable`],
    /// [`CollectError::UpstreamRejected`], or [`CollectError::Timeout`].
    fn publish(&self, path: &str, content: &str, message: &str) -> Result<(), CollectError>;
}
