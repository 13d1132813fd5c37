// crates/pagewatch-providers/src/psi.rs
// ============================================================================
// Module: PageSpeed Insights Client
// Description: Performance probe over the PageSpeed Insights REST API.
// Purpose: Run one audit per device profile with a bounded deadline.
// Dependencies: pagewatch-core, reqwest, serde
// ============================================================================

//! ## Overview
//! One GET per audit invocation, requesting all four Lighthouse categories
//! for the configured strategy. Audits routinely take tens of seconds, so
//! the default deadline is much longer than the GitHub client's. Responses
//! deserialize into the typed [`AuditResponse`] model; structural problems
//! surface later in extraction, not here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use pagewatch_core::AuditResponse;
use pagewatch_core::CollectError;
use pagewatch_core::PerformanceProbe;
use pagewatch_core::Strategy;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::transport::check_status;
use crate::transport::map_transport_error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default audit endpoint; overridable for tests.
const DEFAULT_ENDPOINT: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";
/// Lighthouse categories requested on every audit.
const CATEGORIES: [&str; 4] = ["performance", "accessibility", "best-practices", "seo"];

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the PageSpeed Insights probe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PsiClientConfig {
    /// Optional API key; anonymous quota applies without one.
    pub api_key: Option<String>,
    /// Request timeout in milliseconds; audits are slow by nature.
    pub timeout_ms: u64,
    /// Audit endpoint URL.
    pub endpoint: String,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for PsiClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_ms: 60_000,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: "pagewatch/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Probe Implementation
// ============================================================================

/// Performance probe over the PageSpeed Insights API.
pub struct PsiProbe {
    /// Probe configuration, including endpoint and deadline.
    config: PsiClientConfig,
    /// Blocking HTTP client with a bounded timeout.
    client: Client,
}

impl PsiProbe {
    /// Creates a probe with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::UpstreamUnavailable`] when the HTTP client
    /// cannot be constructed.
    pub fn new(config: PsiClientConfig) -> Result<Self, CollectError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|_| {
                CollectError::UpstreamUnavailable("psi client build failed".to_string())
            })?;
        Ok(Self {
            config,
            client,
        })
    }
}

impl PerformanceProbe for PsiProbe {
    fn audit(&self, target_url: &str, strategy: Strategy) -> Result<AuditResponse, CollectError> {
        let mut params: Vec<(&str, &str)> = vec![
            ("url", target_url),
            ("strategy", strategy.as_str()),
        ];
        for category in CATEGORIES {
            params.push(("category", category));
        }
        if let Some(key) = self.config.api_key.as_deref() {
            params.push(("key", key));
        }

        debug!(target_url, strategy = strategy.as_str(), "starting audit");
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&params)
            .send()
            .map_err(|err| map_transport_error(&err))?;
        check_status(response.status())?;

        let audit: AuditResponse = response
            .json()
            .map_err(|_| CollectError::MalformedResponse("audit response is not json".to_string()))?;
        debug!(target_url, strategy = strategy.as_str(), "audit complete");
        Ok(audit)
    }
}
