//! Client configuration

use std::sync::Arc;

use crate::http::HttpBackend;

/// Configuration for connecting to the dashboard backend
///
/// The bearer token is injected here by the session owner instead of being
/// looked up from ambient storage, so the core's behavior never depends on
/// a hidden global.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Id of the service-fee percent record fetched at snapshot load
    pub percent_id: i64,
}

impl ClientConfig {
    /// Create a new configuration with defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            percent_id: 1,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the service-fee percent record id
    pub fn with_percent_id(mut self, id: i64) -> Self {
        self.percent_id = id;
        self
    }

    /// Create an HTTP backend from this configuration
    pub fn build_backend(&self) -> Arc<HttpBackend> {
        Arc::new(HttpBackend::new(self))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = ClientConfig::new("https://pos.example.com")
            .with_token("jwt")
            .with_timeout(5)
            .with_percent_id(3);
        assert_eq!(config.base_url, "https://pos.example.com");
        assert_eq!(config.token.as_deref(), Some("jwt"));
        assert_eq!(config.timeout, 5);
        assert_eq!(config.percent_id, 3);
    }
}
