//! Configuration types for es-mcp.
//!
//! Settings come from an optional TOML file, overlaid by environment
//! variables. Credentials are only resolved at startup, through
//! [`EsMcpConfig::credentials`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{EsMcpError, Result};

/// Name of the settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "es-mcp.toml";

pub const ENV_CLOUD_ID: &str = "ES_CLOUD_ID";
pub const ENV_URL: &str = "ES_URL";
pub const ENV_API_KEY: &str = "ES_API_KEY";
pub const ENV_TRANSPORT: &str = "ES_MCP_TRANSPORT";
pub const ENV_HTTP_BIND: &str = "ES_MCP_HTTP_BIND";
pub const ENV_WORKDIR: &str = "ES_MCP_WORKDIR";

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EsMcpConfig {
    /// Cluster connection settings.
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,

    /// MCP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Paging defaults.
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Cluster connection configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Elastic Cloud deployment id.
    #[serde(default)]
    pub cloud_id: Option<String>,

    /// Node URL, used when no cloud id is set.
    #[serde(default)]
    pub url: Option<String>,

    /// Encoded API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout. Unset leaves the client default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// MCP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Transport used to talk to the MCP client.
    #[serde(default)]
    pub transport: Transport,

    /// Listen address for the HTTP transport.
    #[serde(default = "default_http_bind")]
    pub http_bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            http_bind: default_http_bind(),
        }
    }
}

/// Pagination configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when a caller gives none (or an invalid one).
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

/// MCP transport selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP.
    Http,
}

impl FromStr for Transport {
    type Err = EsMcpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" | "streamable-http" | "streamable_http" => Ok(Self::Http),
            other => Err(EsMcpError::config(format!(
                "unknown transport '{other}', expected 'stdio' or 'http'"
            ))),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str("stdio"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// Where the cluster lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterLocator {
    CloudId(String),
    Url(String),
}

/// Resolved credentials for connecting to the cluster.
#[derive(Clone, PartialEq, Eq)]
pub struct ClusterCredentials {
    pub locator: ClusterLocator,
    pub api_key: String,
}

impl fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("locator", &self.locator)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

// Default value functions

fn default_http_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_page_size() -> usize {
    10
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl EsMcpConfig {
    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            EsMcpError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Load configuration from the working directory, falling back to the
    /// user config directory, then to defaults.
    pub fn discover(workdir: Option<&Path>) -> Result<Self> {
        let local = match workdir {
            Some(dir) => dir.join(SETTINGS_FILE),
            None => PathBuf::from(SETTINGS_FILE),
        };
        if local.exists() {
            return Self::load(&local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("es-mcp").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Overlay environment variables, read through `lookup` (the process
    /// environment in production).
    ///
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| non_empty(lookup(name));

        if let Some(cloud_id) = var(ENV_CLOUD_ID) {
            self.elasticsearch.cloud_id = Some(cloud_id);
        }
        if let Some(url) = var(ENV_URL) {
            self.elasticsearch.url = Some(url);
        }
        if let Some(api_key) = var(ENV_API_KEY) {
            self.elasticsearch.api_key = Some(api_key);
        }
        if let Some(transport) = var(ENV_TRANSPORT) {
            self.server.transport = transport.parse()?;
        }
        if let Some(bind) = var(ENV_HTTP_BIND) {
            self.server.http_bind = bind;
        }
        Ok(())
    }

    /// Resolve the cluster locator and API key. Both are required.
    pub fn credentials(&self) -> Result<ClusterCredentials> {
        let es = &self.elasticsearch;
        let locator = non_empty(es.cloud_id.clone())
            .map(ClusterLocator::CloudId)
            .or_else(|| non_empty(es.url.clone()).map(ClusterLocator::Url));
        let api_key = non_empty(es.api_key.clone());

        match (locator, api_key) {
            (Some(locator), Some(api_key)) => Ok(ClusterCredentials { locator, api_key }),
            (locator, api_key) => {
                let mut missing = Vec::new();
                if locator.is_none() {
                    missing.push(format!("{ENV_CLOUD_ID} (or {ENV_URL})"));
                }
                if api_key.is_none() {
                    missing.push(ENV_API_KEY.to_string());
                }
                Err(EsMcpError::config(format!(
                    "{} must be set; {} and {} environment variables are required",
                    missing.join(" and "),
                    ENV_CLOUD_ID,
                    ENV_API_KEY
                )))
            }
        }
    }
}
