// crates/pagewatch-providers/src/transport.rs
// ============================================================================
// Module: Provider Transport Helpers
// Description: Shared error mapping for blocking HTTP clients.
// Purpose: Classify transport failures uniformly across providers.
// Dependencies: pagewatch-core, reqwest
// ============================================================================

//! ## Overview
//! Every provider maps transport failures through the same helper so timeout
//! classification stays consistent: a deadline overrun is always
//! [`CollectError::Timeout`], never a generic unavailability.

// ============================================================================
// SECTION: Imports
// ============================================================================

use pagewatch_core::CollectError;

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// Maps a blocking-client transport error onto the shared taxonomy.
pub(crate) fn map_transport_error(err: &reqwest::Error) -> CollectError {
    if err.is_timeout() {
        return CollectError::Timeout;
    }
    // The error display is safe to log; reqwest redacts credentials.
    CollectError::UpstreamUnavailable(err.to_string())
}

/// Rejects a non-success response with its status code.
pub(crate) fn check_status(status: reqwest::StatusCode) -> Result<(), CollectError> {
    if status.is_success() {
        return Ok(());
    }
    Err(CollectError::UpstreamRejected {
        status: status.as_u16(),
    })
}
