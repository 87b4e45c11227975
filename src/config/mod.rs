//! Configuration management module.
//!
//! Handles loading configuration from environment variables.

use std::{env, fmt, time::Duration};

use crate::error::AppError;

/// Default Etherscan v2 endpoint; the chain is selected per request.
pub const DEFAULT_API_URL: &str = "https://api.etherscan.io/v2/api";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// Etherscan API key.
    pub api_key: String,
    /// Etherscan-compatible API endpoint URL.
    pub api_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Config {
    /// Build a configuration with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, AppError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AppError::Config("API key cannot be empty".into()));
        }

        Ok(Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: "info".to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ETHERSCAN_API_KEY`: Etherscan API key
    ///
    /// Optional environment variables:
    /// - `ETHERSCAN_API_URL`: API endpoint (default: Etherscan v2)
    /// - `ETHERSCAN_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `LOG_LEVEL`: Logging level (default: info)
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let api_key = env::var("ETHERSCAN_API_KEY").map_err(|_| {
            AppError::Config("ETHERSCAN_API_KEY environment variable not set".into())
        })?;

        let mut config = Self::new(api_key)?;

        if let Ok(url) = env::var("ETHERSCAN_API_URL") {
            if !url.trim().is_empty() {
                config.api_url = url.trim().to_string();
            }
        }

        if let Ok(secs) = env::var("ETHERSCAN_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("Invalid ETHERSCAN_TIMEOUT_SECS: {}", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("log_level", &self.log_level)
            .finish()
    }
}
