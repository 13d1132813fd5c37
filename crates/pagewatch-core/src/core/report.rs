// crates/pagewatch-core/src/core/report.rs
// ============================================================================
// Module: Pagewatch Report Generator
// Description: Renders a markdown summary from a persisted record.
// Purpose: Produce the deterministic report side-published per commit.
// Dependencies: crate::core::model
// ============================================================================

//! ## Overview
//! The report has a fixed section order: header, scores table, per-device
//! Core Web Vitals tables, then per-device optimization opportunities (only
//! when a device has any). Output is fully determined by the record; there
//! is no randomness and no locale dependence beyond fixed formatting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::model::DeviceMetrics;
use crate::core::model::MetricsRecord;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the markdown report for a persisted record.
#[must_use]
pub fn render_report(record: &MetricsRecord) -> String {
    let mut report = String::new();
    report.push_str(&header_section(record));
    report.push_str(&scores_section(record));
    report.push_str("## Core Web Vitals\n\n");
    report.push_str(&vitals_section("Mobile", &record.mobile));
    report.push_str(&vitals_section("Desktop", &record.desktop));
    report.push_str(&opportunities_section("Mobile", &record.mobile));
    report.push_str(&opportunities_section("Desktop", &record.desktop));
    report.push_str("\n---\n*Generated by Pagewatch*\n");
    report
}

/// Renders the report header with URL, commit, date, message, and author.
fn header_section(record: &MetricsRecord) -> String {
    format!(
        "# PageSpeed Insights Report\n\n**URL**: {}\n**Commit**: [{}]({})\n**Date**: \
         {}\n**Message**: {}\n**Author**: {}\n\n",
        record.target_url,
        record.commit.short_sha,
        record.commit.url,
        record.timestamp,
        record.commit.message,
        record.commit.author,
    )
}

/// Renders the category scores table (mobile and desktop columns).
fn scores_section(record: &MetricsRecord) -> String {
    let mobile = &record.mobile;
    let desktop = &record.desktop;
    format!(
        "## Performance Scores\n\n| Category | Mobile | Desktop |\n|----------|--------|---------|\n\
         | Performance | {:.1} | {:.1} |\n| Accessibility | {:.1} | {:.1} |\n\
         | Best Practices | {:.1} | {:.1} |\n| SEO | {:.1} | {:.1} |\n\n",
        mobile.performance_score,
        desktop.performance_score,
        mobile.accessibility_score,
        desktop.accessibility_score,
        mobile.best_practices_score,
        desktop.best_practices_score,
        mobile.seo_score,
        desktop.seo_score,
    )
}

/// Renders one device's Core Web Vitals table.
fn vitals_section(label: &str, metrics: &DeviceMetrics) -> String {
    format!(
        "### {label}\n| Metric | Value |\n|--------|-------|\n\
         | First Contentful Paint (FCP) | {:.2}s |\n\
         | Largest Contentful Paint (LCP) | {:.2}s |\n\
         | Total Blocking Time (TBT) | {:.0}ms |\n\
         | Cumulative Layout Shift (CLS) | {:.3} |\n\
         | Speed Index | {:.2}s |\n\n",
        metrics.fcp / 1000.0,
        metrics.lcp / 1000.0,
        metrics.tbt,
        metrics.cls,
        metrics.speed_index / 1000.0,
    )
}

/// Renders one device's opportunities section; empty when the device has
/// no opportunities.
fn opportunities_section(label: &str, metrics: &DeviceMetrics) -> String {
    if metrics.opportunities.is_empty() {
        return String::new();
    }
    let mut section = format!("## {label} Optimization Opportunities\n\n");
    for opportunity in &metrics.opportunities {
        section.push_str(&format!(
            "### {}\n**Potential Savings**: {:.2}s\n\n",
            opportunity.title,
            millis_to_seconds(opportunity.savings_ms),
        ));
        if !opportunity.description.is_empty() {
            section.push_str(&format!("{}\n\n", opportunity.description));
        }
    }
    section
}

/// Converts integer milliseconds to fractional seconds for display.
#[allow(
    clippy::cast_precision_loss,
    reason = "Audit savings are far below the f64 integer precision limit."
)]
fn millis_to_seconds(millis: u64) -> f64 {
    millis as f64 / 1000.0
}
