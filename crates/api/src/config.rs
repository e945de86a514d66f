//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GALERIA_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `GALERIA_BASE_URL` - Externally visible base URL (used for provider redirect URLs)
//! - `GALERIA_JWT_SECRET` - Token signing secret (min 32 chars, not a placeholder)
//! - `PAYPAL_CLIENT_ID` - PayPal REST client ID
//! - `PAYPAL_SECRET` - PayPal REST client secret
//!
//! ## Optional
//! - `GALERIA_HOST` - Bind address (default: 127.0.0.1)
//! - `GALERIA_PORT` - Listen port (default: 8000)
//! - `GALERIA_DISPLAY_NAME` - Store name used in transaction descriptions (default: Galería)
//! - `PAYPAL_MODE` - `sandbox` or `live` (default: sandbox)
//! - `PAYPAL_EXCHANGE_RATE` - Fixed base-to-settlement rate (default: 0.00025)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use galeria_core::ExchangeRate;

const MIN_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
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

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password).
    pub database_url: SecretString,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Externally visible base URL.
    pub base_url: String,
    /// JWT signing secret.
    pub jwt_secret: SecretString,
    /// Payment provider configuration.
    pub paypal: PayPalConfig,
}

/// PayPal mode: which API host to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayPalMode {
    Sandbox,
    Live,
}

/// Payment provider configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct PayPalConfig {
    pub mode: PayPalMode,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Fixed base-currency to settlement-currency rate.
    pub exchange_rate: ExchangeRate,
    /// Where the provider redirects the customer after approval.
    pub return_url: String,
    /// Where the provider redirects the customer on cancel.
    pub cancel_url: String,
    /// Store name used in the transaction description.
    pub display_name: String,
}

impl std::fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("mode", &self.mode)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("exchange_rate", &self.exchange_rate)
            .field("return_url", &self.return_url)
            .field("cancel_url", &self.cancel_url)
            .field("display_name", &self.display_name)
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
    /// Returns `ConfigError` if required variables are missing, invalid,
    /// or if secrets fail validation (placeholder/length checks).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("GALERIA_DATABASE_URL")?;
        let host = get_env_or_default("GALERIA_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GALERIA_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("GALERIA_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("GALERIA_PORT".to_owned(), e.to_string()))?;
        let base_url = get_required_env("GALERIA_BASE_URL")?;
        let jwt_secret = get_validated_secret("GALERIA_JWT_SECRET")?;

        let paypal = PayPalConfig::from_env(&base_url)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            jwt_secret,
            paypal,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl PayPalConfig {
    fn from_env(base_url: &str) -> Result<Self, ConfigError> {
        let mode = match get_env_or_default("PAYPAL_MODE", "sandbox").as_str() {
            "sandbox" => PayPalMode::Sandbox,
            "live" => PayPalMode::Live,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "PAYPAL_MODE".to_owned(),
                    format!("expected 'sandbox' or 'live', got '{other}'"),
                ));
            }
        };

        let exchange_rate = get_env_or_default("PAYPAL_EXCHANGE_RATE", "0.00025")
            .parse::<rust_decimal::Decimal>()
            .map(ExchangeRate::new)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PAYPAL_EXCHANGE_RATE".to_owned(), e.to_string())
            })?;

        let base = base_url.trim_end_matches('/');

        Ok(Self {
            mode,
            client_id: get_required_env("PAYPAL_CLIENT_ID")?,
            client_secret: get_required_secret("PAYPAL_SECRET")?,
            exchange_rate,
            return_url: format!("{base}/pagos/aprobar/"),
            cancel_url: format!("{base}/pagos/cancelar/"),
            display_name: get_env_or_default("GALERIA_DISPLAY_NAME", "Galería"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Validate that a secret is long enough and not a placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {MIN_SECRET_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
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
    fn placeholder_secrets_are_rejected() {
        let result = validate_secret_strength("your-jwt-secret-here-your-jwt-secret", "TEST_VAR");
        assert!(matches!(
            result,
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn short_secrets_are_rejected() {
        assert!(validate_secret_strength("short", "TEST_VAR").is_err());
    }

    #[test]
    fn strong_secrets_pass() {
        assert!(validate_secret_strength("kX9mQ2vL7pR4wN8jT3bY6hF1dS5gA0zC", "TEST_VAR").is_ok());
    }

    #[test]
    fn debug_output_redacts_client_secret() {
        let config = PayPalConfig {
            mode: PayPalMode::Sandbox,
            client_id: "client".to_owned(),
            client_secret: SecretString::from("secret".to_owned()),
            exchange_rate: ExchangeRate::new("0.00025".parse().unwrap()),
            return_url: "https://tienda.example/pagos/aprobar/".to_owned(),
            cancel_url: "https://tienda.example/pagos/cancelar/".to_owned(),
            display_name: "Galería".to_owned(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("secret\","));
    }

    #[test]
    fn socket_addr_combines_host_and_port() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/test".to_owned()),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            base_url: "http://localhost:8000".to_owned(),
            jwt_secret: SecretString::from("x".repeat(32)),
            paypal: PayPalConfig {
                mode: PayPalMode::Sandbox,
                client_id: "client".to_owned(),
                client_secret: SecretString::from("secret".to_owned()),
                exchange_rate: ExchangeRate::new("0.00025".parse().unwrap()),
                return_url: "http://localhost:8000/pagos/aprobar/".to_owned(),
                cancel_url: "http://localhost:8000/pagos/cancelar/".to_owned(),
                display_name: "Galería".to_owned(),
            },
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }
}
