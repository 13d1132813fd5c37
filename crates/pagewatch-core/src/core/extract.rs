// crates/pagewatch-core/src/core/extract.rs
// ============================================================================
// Module: Pagewatch Metrics Extractor
// Description: Normalizes a raw audit response into device metrics.
// Purpose: Apply score scaling, timing defaults, and finding classification.
// Dependencies: crate::core::audit, crate::core::model, crate::errors
// ============================================================================

//! ## Overview
//! Extraction validates the required top-level shape once, then treats every
//! remaining lookup as safe optional access with documented defaults.
//! Classification runs two passes over the audit map: audits tagged
//! `opportunity` with a positive numeric value become opportunities; scored
//! numeric-display audits below 1.0 that are not opportunities become
//! diagnostics. Opportunities sort by descending savings, diagnostics by
//! ascending score; both sorts are stable on the stated key only and both
//! lists truncate to the top five.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::audit::AuditEntry;
use crate::core::audit::AuditResponse;
use crate::core::audit::CategoryScore;
use crate::core::model::Diagnostic;
use crate::core::model::DeviceMetrics;
use crate::core::model::MAX_AUDIT_FINDINGS;
use crate::core::model::OptimizationOpportunity;
use crate::core::model::Strategy;
use crate::errors::CollectError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Detail tag marking an audit as a quantified-savings opportunity.
const OPPORTUNITY_TAG: &str = "opportunity";
/// Scoring mode marking an audit as numerically scored.
const NUMERIC_DISPLAY_MODE: &str = "numeric";
/// Audit identifiers read for the timing metrics, in record field order.
const FCP_AUDIT: &str = "first-contentful-paint";
/// Largest Contentful Paint audit identifier.
const LCP_AUDIT: &str = "largest-contentful-paint";
/// Total Blocking Time audit identifier.
const TBT_AUDIT: &str = "total-blocking-time";
/// Time To Interactive audit identifier.
const TTI_AUDIT: &str = "interactive";
/// Speed Index audit identifier.
const SPEED_INDEX_AUDIT: &str = "speed-index";
/// Cumulative Layout Shift audit identifier.
const CLS_AUDIT: &str = "cumulative-layout-shift";

// ============================================================================
// SECTION: Extraction
// ============================================================================

/// Normalizes a raw audit response into [`DeviceMetrics`].
///
/// # Errors
///
/// Returns [`CollectError::MalformedResponse`] when the response lacks the
/// scored result document or a scored performance category. Missing
/// optional fields never fail; they default to zero.
pub fn extract_metrics(
    response: &AuditResponse,
    strategy: Strategy,
) -> Result<DeviceMetrics, CollectError> {
    let result = response.lighthouse_result.as_ref().ok_or_else(|| {
        CollectError::MalformedResponse("response lacks a lighthouse result".to_string())
    })?;
    let performance = result
        .categories
        .performance
        .as_ref()
        .and_then(|category| category.score)
        .ok_or_else(|| {
            CollectError::MalformedResponse(
                "response lacks a scored performance category".to_string(),
            )
        })?;

    let audits = &result.audits;
    Ok(DeviceMetrics {
        strategy,
        performance_score: scale_category_score(performance),
        accessibility_score: optional_category_score(result.categories.accessibility.as_ref()),
        best_practices_score: optional_category_score(result.categories.best_practices.as_ref()),
        seo_score: optional_category_score(result.categories.seo.as_ref()),
        fcp: numeric_audit_value(audits.get(FCP_AUDIT)),
        lcp: numeric_audit_value(audits.get(LCP_AUDIT)),
        tbt: numeric_audit_value(audits.get(TBT_AUDIT)),
        tti: numeric_audit_value(audits.get(TTI_AUDIT)),
        speed_index: numeric_audit_value(audits.get(SPEED_INDEX_AUDIT)),
        cls: numeric_audit_value(audits.get(CLS_AUDIT)),
        opportunities: collect_opportunities(audits),
        diagnostics: collect_diagnostics(audits),
    })
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Collects quantified-savings opportunities, sorted by descending savings
/// and truncated to the top five.
///
/// Savings are rounded to whole milliseconds before the positivity filter,
/// so an audit saving under half a millisecond is excluded rather than kept
/// with a zero value.
fn collect_opportunities(
    audits: &std::collections::BTreeMap<String, AuditEntry>,
) -> Vec<OptimizationOpportunity> {
    let mut opportunities: Vec<OptimizationOpportunity> = audits
        .iter()
        .filter(|(_, audit)| is_opportunity(audit))
        .filter_map(|(id, audit)| {
            let savings_ms = rounded_millis(audit.numeric_value.unwrap_or(0.0));
            (savings_ms > 0).then(|| OptimizationOpportunity {
                id: id.clone(),
                title: audit.title.clone().unwrap_or_default(),
                description: audit.description.clone().unwrap_or_default(),
                savings_ms,
                score: audit.score.unwrap_or(0.0),
            })
        })
        .collect();
    // Stable sort on savings only: ties keep ascending audit-id order.
    opportunities.sort_by(|a, b| b.savings_ms.cmp(&a.savings_ms));
    opportunities.truncate(MAX_AUDIT_FINDINGS);
    opportunities
}

/// Collects sub-1.0 numeric diagnostics, sorted by ascending score and
/// truncated to the top five.
fn collect_diagnostics(
    audits: &std::collections::BTreeMap<String, AuditEntry>,
) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = audits
        .iter()
        .filter(|(_, audit)| !is_opportunity(audit))
        .filter_map(|(id, audit)| {
            let score = audit.score?;
            let numeric_mode = audit
                .score_display_mode
                .as_deref()
                .is_some_and(|mode| mode == NUMERIC_DISPLAY_MODE);
            (score < 1.0 && numeric_mode).then(|| Diagnostic {
                id: id.clone(),
                title: audit.title.clone().unwrap_or_default(),
                description: audit.description.clone().unwrap_or_default(),
                score: round_two_decimals(score),
                display_value: audit.display_value.clone().unwrap_or_default(),
            })
        })
        .collect();
    // Stable sort on score only: most problematic first, ties id-ordered.
    diagnostics.sort_by(|a, b| a.score.total_cmp(&b.score));
    diagnostics.truncate(MAX_AUDIT_FINDINGS);
    diagnostics
}

/// Returns true when the audit carries the opportunity detail tag.
fn is_opportunity(audit: &AuditEntry) -> bool {
    audit
        .details
        .as_ref()
        .and_then(|details| details.detail_type.as_deref())
        .is_some_and(|tag| tag == OPPORTUNITY_TAG)
}

// ============================================================================
// SECTION: Numeric Helpers
// ============================================================================

/// Scales a category score from `[0.0, 1.0]` to `[0.0, 100.0]` with one
/// decimal place.
fn scale_category_score(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}

/// Reads an optional category score, defaulting to 0 when absent.
fn optional_category_score(category: Option<&CategoryScore>) -> f64 {
    scale_category_score(category.and_then(|entry| entry.score).unwrap_or(0.0))
}

/// Reads an audit's numeric value, defaulting to 0 when absent.
fn numeric_audit_value(audit: Option<&AuditEntry>) -> f64 {
    audit.and_then(|entry| entry.numeric_value).unwrap_or(0.0)
}

/// Rounds a score to two decimal places.
fn round_two_decimals(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Rounds a non-negative millisecond value to an integer.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Value is clamped non-negative and audit savings are far below u64::MAX."
)]
fn rounded_millis(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
