// crates/pagewatch-core/src/runtime/mod.rs
// ============================================================================
// Module: Pagewatch Runtime
// Description: Collection-run sequencing.
// Purpose: Group the orchestration layer above the backend interfaces.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime layer sequences one collection run over injected backend
//! interfaces, applying the partial-failure policy: failures at or before
//! persistence abort the run; report publishing is best effort.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod orchestrator;
