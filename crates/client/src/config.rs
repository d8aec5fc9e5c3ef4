//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ANYCART_API_BASE` - Backend base URL (default: `http://127.0.0.1:8000`)
//! - `ANYCART_GOOGLE_CLIENT_ID` - OAuth client ID for Google sign-in
//! - `ANYCART_DATA_DIR` - Directory for session, cart and preference files
//!   (default: the platform data directory plus `anycart`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default backend base URL for local development.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("No data directory available; set ANYCART_DATA_DIR")]
    NoDataDir,
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_base: String,
    /// OAuth client ID for Google sign-in, when configured.
    pub google_client_id: Option<String>,
    /// Directory holding the durable client-side state.
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `ANYCART_API_BASE` is not a valid URL, or
    /// when no data directory can be resolved.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base = normalize_api_base(&get_env_or_default(
            "ANYCART_API_BASE",
            DEFAULT_API_BASE,
        ))?;
        let google_client_id = get_optional_env("ANYCART_GOOGLE_CLIENT_ID");
        let data_dir = resolve_data_dir()?;

        Ok(Self {
            api_base,
            google_client_id,
            data_dir,
        })
    }
}

/// Validate the base URL and strip trailing slashes.
fn normalize_api_base(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim_end_matches('/');
    Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidEnvVar("ANYCART_API_BASE".to_owned(), e.to_string()))?;
    Ok(trimmed.to_owned())
}

/// Resolve the data directory: explicit override, then the platform default.
fn resolve_data_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = get_optional_env("ANYCART_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|base| base.join("anycart"))
        .ok_or(ConfigError::NoDataDir)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
