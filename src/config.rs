//! Configuration types for the IPPure panel.

use crate::args::PanelMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global settings.
    #[serde(default)]
    pub settings: Settings,

    /// Remote endpoint.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Lookup cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Global settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Mode used when the invocation argument does not name one.
    #[serde(default)]
    pub default_mode: PanelMode,
}

/// Remote endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// URL of the info endpoint.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// User-Agent header sent with the request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_url() -> String {
    "https://my.ippure.com/v1/info".to_string()
}

fn default_timeout() -> u64 {
    5000
}

fn default_user_agent() -> String {
    concat!("ippure-panel/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Lookup cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Enable the cache.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// How long a fetched record stays valid (milliseconds).
    #[serde(default = "default_cache_ttl")]
    pub ttl_ms: u64,

    /// Store key holding the serialized record.
    #[serde(default = "default_value_key")]
    pub value_key: String,

    /// Store key holding the fetch timestamp.
    #[serde(default = "default_timestamp_key")]
    pub timestamp_key: String,

    /// File backing the store, shared by every invocation on this host.
    /// Set to `null` for a process-local in-memory store.
    #[serde(default = "default_store_path")]
    pub store_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: default_cache_ttl(),
            value_key: default_value_key(),
            timestamp_key: default_timestamp_key(),
            store_path: default_store_path(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    10_000
}

fn default_value_key() -> String {
    "ippure_cache_json".to_string()
}

fn default_timestamp_key() -> String {
    "ippure_cache_ts".to_string()
}

fn default_store_path() -> Option<PathBuf> {
    Some(std::env::temp_dir().join("ippure-panel-store.json"))
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text, expanding `${VAR}` references.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let expanded = expand_env_vars(content);
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        // Validate endpoint
        let url = url::Url::parse(&self.endpoint.url)
            .map_err(|e| anyhow::anyhow!("Invalid endpoint url '{}': {}", self.endpoint.url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!(
                "Endpoint url must use http or https, got '{}'",
                url.scheme()
            );
        }

        if self.endpoint.timeout_ms == 0 {
            anyhow::bail!("endpoint.timeout_ms must be greater than 0");
        }

        // Validate cache slots
        if self.cache.value_key.is_empty() || self.cache.timestamp_key.is_empty() {
            anyhow::bail!("Cache keys must not be empty");
        }
        if self.cache.value_key == self.cache.timestamp_key {
            anyhow::bail!(
                "cache.value_key and cache.timestamp_key must differ (both '{}')",
                self.cache.value_key
            );
        }

        Ok(())
    }

    /// Generate example configuration YAML.
    pub fn example() -> String {
        r#"# IPPure Panel Configuration

settings:
  default_mode: info           # fraud, native, info or combined

# IPPure info endpoint
endpoint:
  url: "https://my.ippure.com/v1/info"
  timeout_ms: 5000             # Request timeout
  user_agent: "ippure-panel/0.1"

# Short cache so panels refreshed together share one request
cache:
  enabled: true
  ttl_ms: 10000
  value_key: "ippure_cache_json"
  timestamp_key: "ippure_cache_ts"
  store_path: "${HOME}/.cache/ippure-panel/store.json"  # null for in-memory
"#
        .to_string()
    }
}

/// Expand environment variables in the format ${VAR_NAME}.
fn expand_env_vars(content: &str) -> String {
    let re = match regex::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };

    re.replace_all(content, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    })
    .into_owned()
}
