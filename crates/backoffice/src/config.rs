//! Back office configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `COOP_HOST` - Bind address (default: 127.0.0.1)
//! - `COOP_PORT` - Listen port (default: 3000)
//! - `COOP_STORE_BACKEND` - `rest` or `memory` (default: rest)
//! - `COOP_STORE_URL` - Base URL of the document store REST gateway
//! - `COOP_STORE_API_KEY` - Bearer token for the store gateway
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance sample rate (default: 1.0)
//!
//! Store credentials are deliberately not required: when `COOP_STORE_URL`
//! or `COOP_STORE_API_KEY` is absent the server still starts and serves
//! pages, and account operations report the store as unavailable.

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Back office application configuration.
#[derive(Debug, Clone)]
pub struct BackofficeConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Account store backend (`None` when the store is not configured)
    pub store: Option<StoreBackendConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Which account store backend to run against.
#[derive(Debug, Clone)]
pub enum StoreBackendConfig {
    /// In-process store, for local development and tests.
    Memory,
    /// Remote document store behind a REST gateway.
    Rest(StoreRestConfig),
}

/// REST document store gateway configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct StoreRestConfig {
    /// Base URL of the store gateway (no trailing slash)
    pub base_url: String,
    /// Bearer token for the gateway
    pub api_key: SecretString,
}

impl std::fmt::Debug for StoreRestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRestConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl BackofficeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable fails to parse. Missing
    /// store credentials are not an error; they leave `store` unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("COOP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("COOP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("COOP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("COOP_PORT".to_string(), e.to_string()))?;

        let store = StoreBackendConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            store,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreBackendConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match get_env_or_default("COOP_STORE_BACKEND", "rest").as_str() {
            "memory" => Ok(Some(Self::Memory)),
            "rest" => {
                let base_url = get_optional_env("COOP_STORE_URL");
                let api_key = get_optional_env("COOP_STORE_API_KEY");
                match (base_url, api_key) {
                    (Some(base_url), Some(api_key)) => Ok(Some(Self::Rest(StoreRestConfig {
                        base_url: base_url.trim_end_matches('/').to_string(),
                        api_key: SecretString::from(api_key),
                    }))),
                    // Degraded start: pages still serve, account operations 503.
                    _ => Ok(None),
                }
            }
            other => Err(ConfigError::InvalidEnvVar(
                "COOP_STORE_BACKEND".to_string(),
                format!("unknown backend {other:?} (expected \"rest\" or \"memory\")"),
            )),
        }
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
