// crates/pagewatch-store-sqlite/src/lib.rs
// ============================================================================
// Module: Pagewatch SQLite Store
// Description: Durable MetricsStore backed by SQLite WAL.
// Purpose: Persist metrics records keyed by partition and sort key.
// Dependencies: pagewatch-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `SQLite`-backed implementation of the core [`MetricsStore`] interface.
//! Records are stored as JSON documents keyed by `(pk, sk)`; scans paginate
//! with a keyset cursor over the sort key and return records in ascending
//! key order.
//!
//! [`MetricsStore`]: pagewatch_core::MetricsStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteMetricsStore;
pub use store::SqliteMetricsStoreConfig;
pub use store::SqliteMetricsStoreError;
