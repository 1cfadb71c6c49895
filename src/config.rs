//! Process configuration loaded from environment variables.
//!
//! This only covers where things live (endpoints, the key-value file,
//! timeouts). Tokens and vehicle identity are kept in the key-value file
//! itself, see [`crate::store`].

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default auth server.
pub const DEFAULT_AUTH_BASE_URL: &str = "https://auth.tesla.com";
/// Default Owner API server.
pub const DEFAULT_API_BASE_URL: &str = "https://owner-api.teslamotors.com";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the flat `KEY=value` file holding tokens and vehicle identity
    pub config_file: PathBuf,
    /// Base URL of the OAuth2 server
    pub auth_base_url: String,
    /// Base URL of the Owner API
    pub api_base_url: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Socket read timeout, reset by every chunk received
    pub read_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            config_file: PathBuf::from("app.properties"),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(15),
            read_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; a `.env` file is honored for local use.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            config_file: env::var("TESLA_CONFIG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("app.properties")),
            auth_base_url: env::var("TESLA_AUTH_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_AUTH_BASE_URL.to_string()),
            api_base_url: env::var("TESLA_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            connect_timeout: Duration::from_secs(secs_from_env(
                "TESLA_CONNECT_TIMEOUT_SECS",
                15,
            )?),
            read_timeout: Duration::from_secs(secs_from_env("TESLA_READ_TIMEOUT_SECS", 30)?),
        })
    }
}

fn secs_from_env(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
