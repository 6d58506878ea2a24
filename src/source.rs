//! Remote source of IP information.

use crate::config::EndpointConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Error from an IP information lookup.
#[derive(Debug)]
pub enum LookupError {
    /// HTTP request failed.
    Network(reqwest::Error),
    /// Timeout.
    Timeout,
    /// Endpoint answered with a non-success status.
    Status(reqwest::StatusCode),
    /// Endpoint answered with no body.
    EmptyBody,
    /// Body is not a valid record.
    Parse(serde_json::Error),
}

impl LookupError {
    /// Transport-level failure (everything except a malformed body).
    pub fn is_network(&self) -> bool {
        !matches!(self, LookupError::Parse(_))
    }
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Network(e) => write!(f, "Network Error: {}", e),
            LookupError::Timeout => write!(f, "Network Error: request timed out"),
            LookupError::Status(status) => write!(f, "Network Error: HTTP {}", status),
            LookupError::EmptyBody => write!(f, "Network Error"),
            LookupError::Parse(e) => write!(f, "Parse Error: {}", e),
        }
    }
}

impl std::error::Error for LookupError {}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Network(e)
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(e: serde_json::Error) -> Self {
        LookupError::Parse(e)
    }
}

/// Something that can fetch the raw IP information document.
#[async_trait]
pub trait InfoSource: Send + Sync {
    /// Fetch the response body. An empty body is an error.
    async fn fetch(&self) -> Result<String, LookupError>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// IPPure HTTP endpoint.
pub struct HttpInfoSource {
    url: String,
    client: Client,
}

impl HttpInfoSource {
    /// Create a source for the configured endpoint.
    pub fn new(config: &EndpointConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            url: config.url.clone(),
            client,
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InfoSource for HttpInfoSource {
    async fn fetch(&self) -> Result<String, LookupError> {
        debug!(url = %self.url, "Querying IPPure");

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        let body = response.text().await?;
        if body.is_empty() {
            return Err(LookupError::EmptyBody);
        }

        debug!(bytes = body.len(), "IPPure response received");
        Ok(body)
    }

    fn name(&self) -> &str {
        "ippure"
    }
}
