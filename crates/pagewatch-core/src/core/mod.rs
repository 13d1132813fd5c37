// crates/pagewatch-core/src/core/mod.rs
// ============================================================================
// Module: Pagewatch Core Types
// Description: Data model, audit wire model, extraction, report, signature.
// Purpose: Group the backend-independent building blocks of a collection run.
// Dependencies: crate::errors
// ============================================================================

//! ## Overview
//! Core types cover the full life of a collection run: the typed audit
//! response fetched from the probe, the extractor that normalizes it, the
//! persisted record model, the deterministic report renderer, and the
//! webhook signature check that gates externally triggered runs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod extract;
pub mod model;
pub mod report;
pub mod signature;
