//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LUXE_JWT_SECRET` - Session token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `LUXE_HOST` - Bind address (default: 127.0.0.1)
//! - `LUXE_PORT` - Listen port (default: 5000)
//! - `LUXE_STORE` - Store backend, `memory` or `postgres` (default: memory)
//! - `LUXE_DATABASE_URL` - `PostgreSQL` connection string (required when
//!   `LUXE_STORE=postgres`; falls back to `DATABASE_URL`)
//! - `MAIL_API_URL` - Transactional mail API endpoint
//! - `MAIL_API_KEY` - Transactional mail API key
//! - `MAIL_FROM_ADDRESS` - Sender address for outbound mail
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! The three `MAIL_*` variables are set together or not at all; with none
//! set, codes are written to the log instead of sent.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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
    "put-your",
    "add-your",
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

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Which store backend to run against
    pub store: StoreBackend,
    /// Session token signing secret
    pub jwt_secret: SecretString,
    /// Outbound mail configuration; `None` means log-only delivery
    pub mail: Option<MailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Store backend selection. Explicit: the server never falls back from
/// `PostgreSQL` to memory at runtime.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// In-process store seeded with the demo catalog.
    Memory,
    /// `PostgreSQL` store.
    Postgres {
        /// Database connection URL (contains password)
        database_url: SecretString,
    },
}

/// Transactional mail API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct MailConfig {
    /// Mail API endpoint URL
    pub api_url: String,
    /// Mail API key
    pub api_key: SecretString,
    /// Sender address
    pub from_address: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("LUXE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LUXE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LUXE_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LUXE_PORT".to_string(), e.to_string()))?;

        let store = StoreBackend::from_env()?;

        let jwt_secret = get_validated_secret("LUXE_JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "LUXE_JWT_SECRET")?;

        let mail = MailConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            store,
            jwt_secret,
            mail,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreBackend {
    fn from_env() -> Result<Self, ConfigError> {
        match get_env_or_default("LUXE_STORE", "memory").as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres {
                database_url: get_database_url("LUXE_DATABASE_URL")?,
            }),
            other => Err(ConfigError::InvalidEnvVar(
                "LUXE_STORE".to_string(),
                format!("expected 'memory' or 'postgres', got '{other}'"),
            )),
        }
    }
}

impl MailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let api_url = get_optional_env("MAIL_API_URL");
        let api_key = get_optional_env("MAIL_API_KEY");
        let from_address = get_optional_env("MAIL_FROM_ADDRESS");

        match (api_url, api_key, from_address) {
            (Some(api_url), Some(api_key), Some(from_address)) => {
                validate_secret_strength(&api_key, "MAIL_API_KEY")?;
                Ok(Some(Self {
                    api_url,
                    api_key: SecretString::from(api_key),
                    from_address,
                }))
            }
            (None, None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "MAIL_API_URL".to_string(),
                "MAIL_API_URL, MAIL_API_KEY, and MAIL_FROM_ADDRESS must be set together"
                    .to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (set by managed
/// postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
