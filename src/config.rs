//! Client configuration
//!
//! `ClientConfig` is validated once, when it is built, and is read-only
//! afterwards. It can be assembled with the builder or deserialized from
//! YAML/JSON:
//!
//! ```yaml
//! host: https://canvas.example.edu
//! token: 1~abcdef
//! version: v1
//! timeout_secs: 30
//! rate_limit:
//!   requests_per_second: 5
//!   burst_size: 10
//! ```

use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// API version segment used when none is configured
pub const DEFAULT_API_VERSION: &str = "v1";

/// Display name used when none is configured
pub const DEFAULT_NAME: &str = "canvas";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// ClientConfig
// ============================================================================

/// Validated, immutable client configuration
#[derive(Clone)]
pub struct ClientConfig {
    host: Url,
    token: String,
    version: String,
    name: String,
    timeout: Duration,
    user_agent: String,
    rate_limit: Option<RateLimiterConfig>,
}

impl ClientConfig {
    /// Create a config from a host and token with default settings
    pub fn new(host: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        Self::builder().host(host.as_ref()).token(token).build()
    }

    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Deserialize and validate a config from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: RawClientConfig = serde_yaml::from_str(yaml)?;
        raw.into_builder().build()
    }

    /// Deserialize and validate a config from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawClientConfig = serde_json::from_str(json)?;
        raw.into_builder().build()
    }

    /// Load a config file, choosing the format by extension (`.json` or YAML)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn rate_limit(&self) -> Option<&RateLimiterConfig> {
        self.rate_limit.as_ref()
    }

    /// Root of the versioned API on the configured host, e.g. `/api/v1`
    pub fn api_root(&self) -> String {
        format!("/api/{}", self.version)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host.as_str())
            .field("token", &"<redacted>")
            .field("version", &self.version)
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ClientConfig`]
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    host: Option<String>,
    token: Option<String>,
    version: Option<String>,
    name: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    rate_limit: Option<RateLimiterConfig>,
}

impl ClientConfigBuilder {
    /// Set the Canvas host (must be `https://`)
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the bearer token
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the API version segment (default `v1`)
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the display name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Throttle outgoing requests
    #[must_use]
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Validate and build the config
    pub fn build(self) -> Result<ClientConfig> {
        let host = match self.host.as_deref().map(str::trim) {
            None | Some("") => return Err(Error::missing_field("host")),
            Some(host) => parse_host(host)?,
        };

        let version = self
            .version
            .map(|v| v.trim().trim_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        if version.is_empty() || version.contains('/') {
            return Err(Error::invalid_value(
                "version",
                format!("expected a single path segment like 'v1', found '{version}'"),
            ));
        }

        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::invalid_value("timeout", "must be greater than zero"));
        }

        let token = self.token.unwrap_or_default();
        if token.is_empty() {
            warn!(host = %host, "No access token configured; requests will be unauthenticated");
        }

        Ok(ClientConfig {
            host,
            token,
            version,
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| format!("canvas-client/{}", env!("CARGO_PKG_VERSION"))),
            rate_limit: self.rate_limit,
        })
    }
}

/// Parse a host and require the secure scheme
fn parse_host(host: &str) -> Result<Url> {
    let url = Url::parse(host).map_err(|e| {
        Error::config(format!("A Canvas client requires an absolute host URL, found '{host}': {e}"))
    })?;

    if url.scheme() != "https" {
        return Err(Error::config(format!(
            "Hosts must use https://, found {host}"
        )));
    }
    if url.host_str().is_none() {
        return Err(Error::config(format!("Host URL has no host name: {host}")));
    }

    Ok(url)
}

// ============================================================================
// Serde
// ============================================================================

/// On-disk shape; validated through the builder
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClientConfig {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    rate_limit: Option<RateLimiterConfig>,
}

impl RawClientConfig {
    fn into_builder(self) -> ClientConfigBuilder {
        ClientConfigBuilder {
            host: self.host,
            token: self.token,
            version: self.version,
            name: self.name,
            timeout: self.timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent,
            rate_limit: self.rate_limit,
        }
    }
}
