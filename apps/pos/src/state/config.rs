//! # Configuration State
//!
//! Terminal configuration loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`STRIDE_*`)
//! 2. Config file (`pos.toml`)
//! 3. Defaults (this file)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Config file location                                                   │
//! │     ~/.config/pos/pos.toml (Linux)                                      │
//! │     ~/Library/Application Support/vn.stride.pos/pos.toml (macOS)        │
//! │     %APPDATA%\stride\pos\config\pos.toml (Windows)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```toml
//! # pos.toml
//! backend_url = "https://shop.example.vn/api"
//! terminal_id = "quay-02"
//! store_name = "Stride Sneakers Q1"
//! request_timeout_secs = 15
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use stride_client::ClientConfig;
use stride_core::Money;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while loading `pos.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Terminal configuration.
///
/// ## Fields
/// Every field has a development default, so a missing `pos.toml` still
/// yields a working terminal against a local backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosConfig {
    /// Storefront API root
    pub backend_url: String,

    /// Bearer token for the backend
    pub api_token: Option<String>,

    /// Per-request timeout in seconds. Unset keeps the HTTP client default.
    pub request_timeout_secs: Option<u64>,

    /// Identifies this counter; keys the persisted session
    pub terminal_id: String,

    /// Store name (printed on invoices)
    pub store_name: String,

    /// Store address lines (for invoices)
    pub store_address: Vec<String>,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// SQLite file. Unset uses the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Save the cart session after every change and restore it at startup
    pub persist_session: bool,

    /// Re-check a voucher with the backend at checkout when the cart changed
    /// since it was applied
    pub revalidate_stale_voucher: bool,

    /// Products fetched per catalog page
    pub catalog_page_size: u32,
}

impl Default for PosConfig {
    /// Returns defaults suitable for development against a local backend.
    fn default() -> Self {
        PosConfig {
            backend_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            request_timeout_secs: None,
            terminal_id: "pos-01".to_string(),
            store_name: "Stride Sneakers".to_string(),
            store_address: Vec::new(),
            currency_symbol: "₫".to_string(),
            database_path: None,
            persist_session: true,
            revalidate_stale_voucher: true,
            catalog_page_size: 50,
        }
    }
}

impl PosConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`pos.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load POS config: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        info!(?path, "Loading POS config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        crate::project_dirs().map(|dirs| dirs.config_dir().join("pos.toml"))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid(format!(
                "backend_url must start with http:// or https://, got: {}",
                self.backend_url
            )));
        }

        if self.terminal_id.trim().is_empty() {
            return Err(ConfigError::Invalid("terminal_id must not be empty".into()));
        }

        if self.catalog_page_size == 0 {
            return Err(ConfigError::Invalid(
                "catalog_page_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `STRIDE_*` overrides read through `lookup`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("STRIDE_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend_url = url;
        }

        if let Some(token) = lookup("STRIDE_API_TOKEN") {
            self.api_token = Some(token);
        }

        if let Some(id) = lookup("STRIDE_TERMINAL_ID") {
            debug!(terminal_id = %id, "Overriding terminal ID from environment");
            self.terminal_id = id;
        }

        if let Some(name) = lookup("STRIDE_STORE_NAME") {
            self.store_name = name;
        }

        if let Some(path) = lookup("STRIDE_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(secs) = lookup("STRIDE_REQUEST_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.request_timeout_secs = Some(s),
                Err(_) => warn!(value = %secs, "Ignoring invalid STRIDE_REQUEST_TIMEOUT_SECS"),
            }
        }
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// HTTP client settings derived from this config.
    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::new(self.backend_url.clone());
        if let Some(token) = &self.api_token {
            client = client.with_token(token.clone());
        }
        if let Some(secs) = self.request_timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        client
    }

    /// Configured database path, or the platform default.
    pub fn resolved_database_path(&self) -> Result<PathBuf, std::io::Error> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => crate::default_database_path(),
        }
    }

    /// Formats an amount with the configured currency symbol.
    ///
    /// ## Example
    /// ```rust
    /// use stride_core::Money;
    /// use stride_pos::state::PosConfig;
    ///
    /// let config = PosConfig::default();
    /// assert_eq!(config.format_money(Money::new(9_500_000)), "9.500.000 ₫");
    /// ```
    pub fn format_money(&self, amount: Money) -> String {
        format!("{} {}", amount.grouped(), self.currency_symbol)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
