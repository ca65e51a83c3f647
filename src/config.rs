//! Configuration loader for the `powerwatch` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Handlers never read the environment themselves;
//! they receive what they need through the application state.
//!
use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Parse an optional numeric environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// TCP port the HTTP server listens on.
    pub port: u16,

    /// API key for the generative-language service.
    pub gemini_api_key: String,

    /// Model name used for summary generation.
    pub gemini_model: String,

    /// Base URL of the generative-language REST API.
    pub gemini_api_url: String,

    /// Per-request timeout for summary generation.
    pub gemini_timeout: Duration,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
/// - `GEMINI_API_KEY` – generative-language API key
///
/// Optional:
/// - `PORT` – listen port (default: 3001)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `GEMINI_MODEL` – model name (default: `gemini-1.5-flash`)
/// - `GEMINI_API_URL` – API base URL (default: Google's public endpoint)
/// - `GEMINI_TIMEOUT_SECS` – request timeout in seconds (default: 30)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let gemini_api_key = require_env!("GEMINI_API_KEY");
    let db_pool_max = parse_env!("DB_POOL_MAX", u32, 5);
    let port = parse_env!("PORT", u16, DEFAULT_PORT);
    let timeout_secs = parse_env!("GEMINI_TIMEOUT_SECS", u64, 30);

    let gemini_model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into());
    let gemini_api_url =
        env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.into());

    Ok(Config {
        db_url,
        db_pool_max,
        port,
        gemini_api_key,
        gemini_model,
        gemini_api_url,
        gemini_timeout: Duration::from_secs(timeout_secs),
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the database password and the API key.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL        : {}", self.masked_db_url());
        tracing::info!("  DB_POOL_MAX         : {}", self.db_pool_max);
        tracing::info!("  PORT                : {}", self.port);
        tracing::info!("  GEMINI_API_KEY      : {}", mask_secret(&self.gemini_api_key));
        tracing::info!("  GEMINI_MODEL        : {}", self.gemini_model);
        tracing::info!("  GEMINI_API_URL      : {}", self.gemini_api_url);
        tracing::info!("  GEMINI_TIMEOUT_SECS : {}", self.gemini_timeout.as_secs());
    }

    /// Database URL with the password replaced by `****`.
    pub fn masked_db_url(&self) -> String {
        // ---
        if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                return format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                );
            }
        }
        self.db_url.clone()
    }
}

fn mask_secret(secret: &str) -> String {
    // ---
    match secret.char_indices().nth(4) {
        Some((idx, _)) => format!("{}****", &secret[..idx]),
        None => "****".to_string(),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn config_with_db_url(db_url: &str) -> Config {
        Config {
            db_url: db_url.to_string(),
            db_pool_max: 5,
            port: DEFAULT_PORT,
            gemini_api_key: "AIzaSyExample".to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            gemini_timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_db_password_is_masked() {
        let cfg = config_with_db_url("postgres://meter:hunter2@db:5432/telemetry");
        assert_eq!(cfg.masked_db_url(), "postgres://meter:****@db:5432/telemetry");
    }

    #[test]
    fn test_db_url_without_credentials_is_unchanged() {
        let cfg = config_with_db_url("postgres://localhost/telemetry");
        assert_eq!(cfg.masked_db_url(), "postgres://localhost/telemetry");
    }

    #[test]
    fn test_secret_masking() {
        assert_eq!(mask_secret("AIzaSyExample"), "AIza****");
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
