//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PAPERBARK_DATABASE_URL` - `PostgreSQL` connection string
//! - `PAPERBARK_BASE_URL` - Public URL for the storefront
//! - `PAPERBARK_SESSION_SECRET` - Session signing secret (min 32 chars)
//!
//! ## Optional
//! - `PAPERBARK_HOST` - Bind address (default: 127.0.0.1)
//! - `PAPERBARK_PORT` - Listen port (default: 3000)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present; ignore errors (no .env in production)
        let _ = dotenvy::dotenv();

        let database_url = require("PAPERBARK_DATABASE_URL")?;
        let base_url = require("PAPERBARK_BASE_URL")?;
        let session_secret = require("PAPERBARK_SESSION_SECRET")?;
        validate_secret("PAPERBARK_SESSION_SECRET", &session_secret)?;

        let host = optional("PAPERBARK_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PAPERBARK_HOST".to_owned(), e.to_string()))?;

        let port = optional("PAPERBARK_PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PAPERBARK_PORT".to_owned(), e.to_string()))?;

        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port,
            base_url,
            session_secret: SecretString::from(session_secret),
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn require(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Reject secrets that are too short or look like unchanged placeholders.
fn validate_secret(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_owned(),
            format!("must be at least {MIN_SESSION_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lowered.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            name.to_owned(),
            format!("looks like a placeholder (contains {pattern:?})"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secrets_are_rejected() {
        assert!(matches!(
            validate_secret("TEST", "tooshort"),
            Err(ConfigError::InsecureSecret(..))
        ));
    }

    #[test]
    fn placeholder_secrets_are_rejected() {
        let value = "changeme-changeme-changeme-changeme";
        assert!(matches!(
            validate_secret("TEST", value),
            Err(ConfigError::InsecureSecret(..))
        ));
    }

    #[test]
    fn long_random_secrets_pass() {
        assert!(validate_secret("TEST", "kf83nWq91xLp04vZr6Tm2cYh85sQdJbA").is_ok());
    }
}
