// crates/pagewatch-core/src/core/audit.rs
// ============================================================================
// Module: Pagewatch Audit Wire Model
// Description: Typed shape of a raw performance-probe response.
// Purpose: Replace duck-typed JSON traversal with explicit optional fields.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The probe returns a large document of which Pagewatch reads a small,
//! stable subset: a scored-category map and an audit-id-to-result map.
//! Required top-level shape is validated once by the extractor; every other
//! field is an explicit `Option` with a documented default, so lookups past
//! the boundary never fail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Response Shape
// ============================================================================

/// Raw audit response as returned by the performance probe.
///
/// # Invariants
/// - `lighthouse_result` is required for extraction; its absence is a
///   malformed response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    /// Scored categories and per-audit results.
    #[serde(default)]
    pub lighthouse_result: Option<LighthouseResult>,
}

/// The scored portion of an audit response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseResult {
    /// Aggregate category scores.
    #[serde(default)]
    pub categories: LighthouseCategories,
    /// Map from audit identifier to audit result.
    ///
    /// A `BTreeMap` keeps classification order deterministic: entries are
    /// visited in ascending audit-id order, and the stable sorts downstream
    /// preserve that order among ties.
    #[serde(default)]
    pub audits: BTreeMap<String, AuditEntry>,
}

/// Aggregate category scores keyed by the fixed audit category set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LighthouseCategories {
    /// Performance category; required for extraction.
    #[serde(default)]
    pub performance: Option<CategoryScore>,
    /// Accessibility category; defaults to score 0 when absent.
    #[serde(default)]
    pub accessibility: Option<CategoryScore>,
    /// Best-practices category; defaults to score 0 when absent.
    #[serde(default, rename = "best-practices")]
    pub best_practices: Option<CategoryScore>,
    /// SEO category; defaults to score 0 when absent.
    #[serde(default)]
    pub seo: Option<CategoryScore>,
}

/// A single aggregate category score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Aggregate score in `[0.0, 1.0]`.
    #[serde(default)]
    pub score: Option<f64>,
}

/// A single named audit result.
///
/// # Invariants
/// - All fields are optional on the wire; defaults are applied by the
///   extractor, never during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Human-readable audit title.
    #[serde(default)]
    pub title: Option<String>,
    /// Human-readable audit description.
    #[serde(default)]
    pub description: Option<String>,
    /// Audit score in `[0.0, 1.0]` when scored.
    #[serde(default)]
    pub score: Option<f64>,
    /// Scoring mode label (for example `numeric` or `binary`).
    #[serde(default)]
    pub score_display_mode: Option<String>,
    /// Display string for the audit value.
    #[serde(default)]
    pub display_value: Option<String>,
    /// Numeric audit value; milliseconds for timing audits, estimated
    /// savings for opportunities, unitless for layout shift.
    #[serde(default)]
    pub numeric_value: Option<f64>,
    /// Structured details carrying the opportunity classification tag.
    #[serde(default)]
    pub details: Option<AuditDetails>,
}

/// Structured audit details; only the detail tag is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditDetails {
    /// Detail type tag; `"opportunity"` marks quantified-savings audits.
    #[serde(default, rename = "type")]
    pub detail_type: Option<String>,
}
