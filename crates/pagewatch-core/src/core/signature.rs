// crates/pagewatch-core/src/core/signature.rs
// ============================================================================
// Module: Pagewatch Webhook Signature
// Description: HMAC-SHA256 verification for signed webhook payloads.
// Purpose: Gate externally triggered collection runs in constant time.
// Dependencies: hmac, sha2, hex
// ============================================================================

//! ## Overview
//! Webhook deliveries are signed with HMAC-SHA256 over the raw request body
//! using a shared secret, transported as `sha256=<hex>`. Verification
//! recomputes the tag and compares in constant time; any malformed header,
//! bad hex, or tag mismatch yields the same error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

use crate::errors::CollectError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Scheme prefix carried by the signature header.
const SIGNATURE_PREFIX: &str = "sha256=";

/// HMAC-SHA256 instantiation used for webhook signatures.
type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Verifies an HMAC-SHA256 signature header against the raw request body.
///
/// The comparison is constant time. A missing header, a header without the
/// `sha256=` prefix, invalid hex, and a tag mismatch all fail identically.
///
/// # Errors
///
/// Returns [`CollectError::SignatureInvalid`] when verification fails and
/// [`CollectError::ConfigurationMissing`] when the secret is empty.
pub fn verify_signature(
    secret: &str,
    body: &[u8],
    header: Option<&str>,
) -> Result<(), CollectError> {
    if secret.is_empty() {
        return Err(CollectError::ConfigurationMissing("webhook secret".to_string()));
    }
    let header = header.ok_or(CollectError::SignatureInvalid)?;
    let encoded = header.strip_prefix(SIGNATURE_PREFIX).ok_or(CollectError::SignatureInvalid)?;
    let expected = hex::decode(encoded).map_err(|_| CollectError::SignatureInvalid)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| CollectError::SignatureInvalid)?;
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| CollectError::SignatureInvalid)
}

/// Computes the `sha256=<hex>` signature header for a body and secret.
///
/// Used by delivery tooling and tests; verification goes through
/// [`verify_signature`].
#[must_use]
pub fn signature_header(secret: &str, body: &[u8]) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}
