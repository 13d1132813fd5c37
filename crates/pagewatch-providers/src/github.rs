// crates/pagewatch-providers/src/github.rs
// ============================================================================
// Module: GitHub Client
// Description: Commit source and report publisher over the GitHub REST API.
// Purpose: Fetch head-commit metadata and side-publish markdown reports.
// Dependencies: pagewatch-core, reqwest, serde, serde_json, base64
// ============================================================================

//! ## Overview
//! Two clients over the same REST surface: [`GithubCommitSource`] reads the
//! head commit of the monitored branch, and [`GithubReportPublisher`] writes
//! a rendered report file through the contents API (create when absent,
//! update with the current blob sha when present). The commit source works
//! unauthenticated against public repositories; the publisher always
//! requires a write-capable token.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use pagewatch_core::CollectError;
use pagewatch_core::CommitInfo;
use pagewatch_core::CommitSource;
use pagewatch_core::ReportPublisher;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::transport::check_status;
use crate::transport::map_transport_error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default REST API base; overridable for tests.
const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Media type pinned on every REST request.
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration shared by the GitHub commit source and report publisher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubClientConfig {
    /// Repository in `owner/name` form.
    pub repo: String,
    /// Branch whose head is fetched and whose tree receives reports.
    pub branch: String,
    /// Optional access token; required only for publishing.
    pub token: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    pub user_agent: String,
    /// REST API base URL.
    pub api_base: String,
}

impl Default for GithubClientConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            branch: "main".to_string(),
            token: None,
            timeout_ms: 10_000,
            user_agent: "pagewatch/0.1".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Builds the blocking client used by both GitHub roles.
fn build_client(config: &GithubClientConfig) -> Result<Client, CollectError> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|_| CollectError::UpstreamUnavailable("github client build failed".to_string()))
}

/// Applies the pinned media type and optional token to a request.
fn decorate(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    let builder = builder.header("Accept", ACCEPT_HEADER);
    match token {
        Some(token) => builder.header("Authorization", format!("token {token}")),
        None => builder,
    }
}

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// Head-commit response from `GET /repos/{repo}/commits/{branch}`.
#[derive(Debug, Deserialize)]
struct CommitResponse {
    /// Full commit identifier.
    sha: Option<String>,
    /// Nested commit body.
    commit: Option<CommitBody>,
    /// Browsable commit URL.
    html_url: Option<String>,
}

/// Nested commit body with message and author.
#[derive(Debug, Deserialize)]
struct CommitBody {
    /// Full commit message.
    message: Option<String>,
    /// Author block.
    author: Option<CommitAuthor>,
}

/// Author block with display name and authored timestamp.
#[derive(Debug, Deserialize)]
struct CommitAuthor {
    /// Author display name.
    name: Option<String>,
    /// Authored timestamp as reported by GitHub.
    date: Option<String>,
}

/// Existing-file response from the contents API; only the blob sha matters.
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    /// Current blob sha of the existing file.
    sha: Option<String>,
}

// ============================================================================
// SECTION: Commit Source
// ============================================================================

/// Commit source over the GitHub REST API.
pub struct GithubCommitSource {
    /// Client configuration, including repository and branch.
    config: GithubClientConfig,
    /// Blocking HTTP client with a bounded timeout.
    client: Client,
}

impl GithubCommitSource {
    /// Creates a commit source with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::UpstreamUnavailable`] when the HTTP client
    /// cannot be constructed.
    pub fn new(config: GithubClientConfig) -> Result<Self, CollectError> {
        let client = build_client(&config)?;
        Ok(Self {
            config,
            client,
        })
    }
}

impl CommitSource for GithubCommitSource {
    fn latest_commit(&self) -> Result<CommitInfo, CollectError> {
        let url = format!(
            "{}/repos/{}/commits/{}",
            self.config.api_base, self.config.repo, self.config.branch
        );
        let response = decorate(self.client.get(&url), self.config.token.as_deref())
            .send()
            .map_err(|err| map_transport_error(&err))?;
        check_status(response.status())?;

        let body: CommitResponse = response
            .json()
            .map_err(|_| CollectError::MalformedResponse("commit response is not json".to_string()))?;
        let sha = body
            .sha
            .ok_or_else(|| CollectError::MalformedResponse("commit sha missing".to_string()))?;
        let commit = body
            .commit
            .ok_or_else(|| CollectError::MalformedResponse("commit body missing".to_string()))?;
        let message = commit
            .message
            .ok_or_else(|| CollectError::MalformedResponse("commit message missing".to_string()))?;
        let author = commit.author.unwrap_or(CommitAuthor {
            name: None,
            date: None,
        });

        debug!(repo = %self.config.repo, branch = %self.config.branch, "fetched head commit");
        CommitInfo::new(
            &sha,
            &message,
            author.name.as_deref().unwrap_or("unknown"),
            author.date.as_deref().unwrap_or_default(),
            body.html_url.as_deref().unwrap_or_default(),
        )
    }
}

// ============================================================================
// SECTION: Report Publisher
// ============================================================================

/// Report publisher over the GitHub contents API.
#[derive(Debug)]
pub struct GithubReportPublisher {
    /// Client configuration; the token is guaranteed present.
    config: GithubClientConfig,
    /// Blocking HTTP client with a bounded timeout.
    client: Client,
}

impl GithubReportPublisher {
    /// Creates a publisher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::ConfigurationMissing`] when no token is
    /// configured and [`CollectError::UpstreamUnavailable`] when the HTTP
    /// client cannot be constructed.
    pub fn new(config: GithubClientConfig) -> Result<Self, CollectError> {
        if config.token.as_deref().unwrap_or_default().is_empty() {
            return Err(CollectError::ConfigurationMissing("github token".to_string()));
        }
        let client = build_client(&config)?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Returns the current blob sha of `path`, or `None` when absent.
    fn existing_blob_sha(&self, path: &str) -> Result<Option<String>, CollectError> {
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.config.api_base, self.config.repo, path
        );
        let response = decorate(self.client.get(&url), self.config.token.as_deref())
            .query(&[("ref", self.config.branch.as_str())])
            .send()
            .map_err(|err| map_transport_error(&err))?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        check_status(response.status())?;
        let body: ContentsResponse = response.json().map_err(|_| {
            CollectError::MalformedResponse("contents response is not json".to_string())
        })?;
        Ok(body.sha)
    }
}

impl ReportPublisher for GithubReportPublisher {
    fn publish(&self, path: &str, content: &str, message: &str) -> Result<(), CollectError> {
        let blob_sha = self.existing_blob_sha(path)?;
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.config.api_base, self.config.repo, path
        );
        let mut payload = json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
            "branch": self.config.branch,
        });
        if let Some(sha) = &blob_sha {
            payload["sha"] = json!(sha);
        }

        let response = decorate(self.client.put(&url), self.config.token.as_deref())
            .json(&payload)
            .send()
            .map_err(|err| map_transport_error(&err))?;
        check_status(response.status())?;
        debug!(path, updated = blob_sha.is_some(), "published report file");
        Ok(())
    }
}
