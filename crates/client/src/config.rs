//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional and fall back to local-development defaults:
//!
//! - `JACARANDA_API_URL` - Base URL of the shop backend (default: `http://localhost:3000`)
//! - `JACARANDA_STORAGE_DIR` - Directory for durable client state such as
//!   carts and the cached identity (default: `.jacaranda`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_STORAGE_DIR: &str = ".jacaranda";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client SDK configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the shop backend API.
    pub api_url: Url,
    /// Directory where per-user carts and the cached identity are persisted.
    pub storage_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `JACARANDA_API_URL` is set but not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_env_or_default("JACARANDA_API_URL", DEFAULT_API_URL)
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("JACARANDA_API_URL".to_string(), e.to_string()))?;
        let storage_dir = PathBuf::from(get_env_or_default(
            "JACARANDA_STORAGE_DIR",
            DEFAULT_STORAGE_DIR,
        ));

        Ok(Self {
            api_url,
            storage_dir,
        })
    }

    /// Build a configuration directly, bypassing the environment.
    #[must_use]
    pub const fn new(api_url: Url, storage_dir: PathBuf) -> Self {
        Self {
            api_url,
            storage_dir,
        }
    }

    /// The API base URL without a trailing slash, ready for path concatenation.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_url.as_str().trim_end_matches('/')
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_strips_trailing_slash() {
        let config = ClientConfig::new(
            "https://api.example.com/".parse().unwrap(),
            PathBuf::from("/tmp/state"),
        );
        assert_eq!(config.api_base(), "https://api.example.com");
    }

    #[test]
    fn test_api_base_keeps_path_prefix() {
        let config = ClientConfig::new(
            "https://example.com/api/v1".parse().unwrap(),
            PathBuf::from("state"),
        );
        assert_eq!(config.api_base(), "https://example.com/api/v1");
    }
}
