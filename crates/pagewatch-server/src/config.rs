// crates/pagewatch-server/src/config.rs
// ============================================================================
// Module: Pagewatch Configuration
// Description: TOML configuration with environment secret overrides.
// Purpose: Resolve, parse, and validate runtime configuration fail-closed.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Configuration comes from a TOML file (`pagewatch.toml` by default, path
//! overridable with `--config` or `PAGEWATCH_CONFIG`). Secrets are never
//! required in the file: `PAGEWATCH_GITHUB_TOKEN`, `PAGEWATCH_WEBHOOK_SECRET`,
//! and `PAGEWATCH_PSI_API_KEY` override their file counterparts when set.
//! Validation is strict; an invalid file refuses to start the process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration file name.
const DEFAULT_CONFIG_FILE: &str = "pagewatch.toml";
/// Environment variable overriding the configuration path.
const CONFIG_PATH_ENV: &str = "PAGEWATCH_CONFIG";
/// Environment variable carrying the GitHub token.
const GITHUB_TOKEN_ENV: &str = "PAGEWATCH_GITHUB_TOKEN";
/// Environment variable carrying the webhook shared secret.
const WEBHOOK_SECRET_ENV: &str = "PAGEWATCH_WEBHOOK_SECRET";
/// Environment variable carrying the PageSpeed Insights API key.
const PSI_API_KEY_ENV: &str = "PAGEWATCH_PSI_API_KEY";
/// Maximum configuration file size accepted.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem error reading the configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parse error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Semantically invalid configuration.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// GitHub repository section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubSection {
    /// Repository in `owner/name` form.
    pub repo: String,
    /// Branch whose head is monitored and whose tree receives reports.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_github_timeout_ms")]
    pub timeout_ms: u64,
    /// Optional access token; usually supplied via environment.
    #[serde(default)]
    pub token: Option<String>,
    /// Optional API base override for local testing.
    #[serde(default)]
    pub api_base: Option<String>,
}

/// PageSpeed Insights section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct PsiSection {
    /// Optional API key; usually supplied via environment.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds; audits are slow by nature.
    #[serde(default = "default_psi_timeout_ms")]
    pub timeout_ms: u64,
    /// Optional endpoint override for local testing.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Metrics store section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreSection {
    /// Path to the `SQLite` database file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// HTTP server section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Bind address for the HTTP listener.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Webhook shared secret; usually supplied via environment.
    #[serde(default)]
    pub webhook_secret: Option<String>,
    /// Optional background collection interval in seconds.
    #[serde(default)]
    pub collect_interval_secs: Option<u64>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            webhook_secret: None,
            collect_interval_secs: None,
        }
    }
}

/// Returns the default monitored branch.
fn default_branch() -> String {
    "main".to_string()
}

/// Returns the default GitHub request timeout.
const fn default_github_timeout_ms() -> u64 {
    10_000
}

/// Returns the default PageSpeed Insights request timeout.
const fn default_psi_timeout_ms() -> u64 {
    60_000
}

/// Returns the default database path.
fn default_store_path() -> PathBuf {
    PathBuf::from("pagewatch.db")
}

/// Returns the default HTTP bind address.
fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

// ============================================================================
// SECTION: Root Configuration
// ============================================================================

/// Root Pagewatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PagewatchConfig {
    /// URL the performance audits run against.
    pub target_url: String,
    /// GitHub repository section.
    pub github: GithubSection,
    /// PageSpeed Insights section.
    #[serde(default)]
    pub psi: PsiSection,
    /// Metrics store section.
    #[serde(default)]
    pub store: StoreSection,
    /// HTTP server section.
    #[serde(default)]
    pub server: ServerSection,
}

impl PagewatchConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path);
        let bytes = fs::read(&resolved).map_err(|err| {
            ConfigError::Io(format!("{}: {err}", resolved.display()))
        })?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Overrides file-based secrets with environment values when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = env::var(GITHUB_TOKEN_ENV)
            && !token.is_empty()
        {
            self.github.token = Some(token);
        }
        if let Ok(secret) = env::var(WEBHOOK_SECRET_ENV)
            && !secret.is_empty()
        {
            self.server.webhook_secret = Some(secret);
        }
        if let Ok(key) = env::var(PSI_API_KEY_ENV)
            && !key.is_empty()
        {
            self.psi.api_key = Some(key);
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when any field is out of contract.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_url.starts_with("https://") && !self.target_url.starts_with("http://") {
            return Err(ConfigError::Invalid(
                "target_url must be an http(s) url".to_string(),
            ));
        }
        let mut parts = self.github.repo.split('/');
        let owner = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        if owner.is_empty() || name.is_empty() || parts.next().is_some() {
            return Err(ConfigError::Invalid("github.repo must be owner/name".to_string()));
        }
        if self.github.branch.is_empty() {
            return Err(ConfigError::Invalid("github.branch must not be empty".to_string()));
        }
        if self.github.timeout_ms == 0 || self.psi.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(
                "server.bind_addr must be a socket address".to_string(),
            ));
        }
        if self.server.collect_interval_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "server.collect_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolves the configuration path from argument, environment, or default.
fn resolve_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV)
        && !env_path.is_empty()
    {
        return PathBuf::from(env_path);
    }
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
