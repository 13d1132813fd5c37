// crates/pagewatch-providers/src/lib.rs
// ============================================================================
// Module: Pagewatch Providers
// Description: Concrete backend clients for the collection interfaces.
// Purpose: Reach GitHub and PageSpeed Insights over bounded HTTP.
// Dependencies: pagewatch-core, reqwest, serde, serde_json, base64, tracing
// ============================================================================

//! ## Overview
//! Implementations of the core backend interfaces over blocking HTTP:
//! a GitHub client acting as both commit source and report publisher, and a
//! PageSpeed Insights client acting as the performance probe. Every request
//! carries a bounded timeout; no client retries internally.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod github;
pub mod psi;

mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use github::GithubClientConfig;
pub use github::GithubCommitSource;
pub use github::GithubReportPublisher;
pub use psi::PsiClientConfig;
pub use psi::PsiProbe;
