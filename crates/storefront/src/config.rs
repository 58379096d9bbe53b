//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RENEWLY_BASE_URL` - Public URL for the storefront
//! - `RENEWLY_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `RENEWLY_HOST` - Bind address (default: 127.0.0.1)
//! - `RENEWLY_PORT` - Listen port (default: 3000)
//! - `IDENTITY_URL` / `IDENTITY_PUBLIC_KEY` - Hosted identity provider
//! - `SEARCH_URL` / `SEARCH_API_KEY` / `SEARCH_PRODUCTS_INDEX` - Hosted search index
//! - `USERDATA_URL` / `USERDATA_SERVICE_KEY` - Hosted per-identity data store
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! Each hosted service is an independent optional block: when its variables
//! are absent the storefront runs without it (guest-only auth, sample
//! catalog instead of live search, local-only collections) rather than
//! refusing to start.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Hosted identity provider, when configured
    pub identity: Option<IdentityConfig>,
    /// Hosted search index, when configured
    pub search: Option<SearchConfig>,
    /// Hosted per-identity data store, when configured
    pub user_data: Option<UserDataConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Hosted identity provider configuration.
///
/// Implements `Debug` manually to redact the key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Base URL of the identity service
    pub url: String,
    /// Publishable API key sent with every request
    pub public_key: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url)
            .field("public_key", &"[REDACTED]")
            .finish()
    }
}

/// Hosted search index configuration.
#[derive(Clone)]
pub struct SearchConfig {
    /// Base URL of the search service
    pub url: String,
    /// Search API key
    pub api_key: SecretString,
    /// Name of the products index
    pub products_index: String,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("products_index", &self.products_index)
            .finish()
    }
}

/// Hosted per-identity data store configuration.
#[derive(Clone)]
pub struct UserDataConfig {
    /// Base URL of the data service
    pub url: String,
    /// Service key sent with every request
    pub service_key: SecretString,
}

impl std::fmt::Debug for UserDataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDataConfig")
            .field("url", &self.url)
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
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

        let host = get_env_or_default("RENEWLY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("RENEWLY_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("RENEWLY_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("RENEWLY_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("RENEWLY_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("RENEWLY_BASE_URL".to_string(), e.to_string())
        })?;
        let session_secret = get_validated_secret("RENEWLY_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "RENEWLY_SESSION_SECRET")?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            identity: IdentityConfig::from_env(),
            search: SearchConfig::from_env(),
            user_data: UserDataConfig::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl IdentityConfig {
    fn from_env() -> Option<Self> {
        Some(Self {
            url: get_optional_env("IDENTITY_URL")?,
            public_key: SecretString::from(get_optional_env("IDENTITY_PUBLIC_KEY")?),
        })
    }
}

impl SearchConfig {
    fn from_env() -> Option<Self> {
        Some(Self {
            url: get_optional_env("SEARCH_URL")?,
            api_key: SecretString::from(get_optional_env("SEARCH_API_KEY")?),
            products_index: get_env_or_default("SEARCH_PRODUCTS_INDEX", "products"),
        })
    }
}

impl UserDataConfig {
    fn from_env() -> Option<Self> {
        Some(Self {
            url: get_optional_env("USERDATA_URL")?,
            service_key: SecretString::from(get_optional_env("USERDATA_SERVICE_KEY")?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_degenerate_inputs() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        assert!(validate_secret_strength("your-api-key-here", "TEST_VAR").is_err());
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_session_secret_length() {
        let short = SecretString::from("short");
        assert!(validate_session_secret(&short, "TEST_SESSION").is_err());

        let ok = SecretString::from("a".repeat(32));
        assert!(validate_session_secret(&ok, "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            identity: None,
            search: None,
            user_data: None,
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_service_config_debug_redacts_secrets() {
        let config = SearchConfig {
            url: "https://search.renewly.example".to_string(),
            api_key: SecretString::from("super_secret_search_key"),
            products_index: "products".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("https://search.renewly.example"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_search_key"));
    }
}
