//! Client configuration

use std::time::Duration;

/// Connection settings for the storefront backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `"https://shop.example.vn/api"`
    pub base_url: String,

    /// Bearer token sent on every request
    pub token: Option<String>,

    /// Per-request timeout. `None` keeps reqwest's default.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a new configuration without token or timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: None,
        }
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
