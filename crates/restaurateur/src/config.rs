//! Restaurateur configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RESTAURATEUR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `RESTAURATEUR_HOST` - Bind address (default: 127.0.0.1)
//! - `RESTAURATEUR_PORT` - Listen port (default: 8000)
//! - `YANDEX_GEO_APIKEY` - Yandex geocoder API key; geocoding is disabled without it
//! - `GEOCODER_BASE_URL` - Geocoder endpoint (default: <https://geocode-maps.yandex.ru/1.x>)
//! - `GEOCODER_TIMEOUT_SECS` - Geocoder request timeout (default: 10)
//! - `COORDINATE_CACHE_CAPACITY` - In-process coordinate memo size (default: 10000)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_GEOCODER_BASE_URL: &str = "https://geocode-maps.yandex.ru/1.x";
const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_COORDINATE_CACHE_CAPACITY: u64 = 10_000;

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

/// Restaurateur application configuration.
#[derive(Debug, Clone)]
pub struct RestaurateurConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Geocoder configuration (absent when no API key is set)
    pub geocoder: Option<GeocoderConfig>,
    /// Maximum number of addresses kept in the in-process coordinate memo
    pub coordinate_cache_capacity: u64,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Yandex geocoder configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeocoderConfig {
    /// Yandex geocoder API key
    pub api_key: SecretString,
    /// Endpoint URL
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for GeocoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocoderConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RestaurateurConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = get_database_url("RESTAURATEUR_DATABASE_URL")?;
        let host = get_env_or_default("RESTAURATEUR_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("RESTAURATEUR_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("RESTAURATEUR_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("RESTAURATEUR_PORT".to_string(), e.to_string()))?;
        let geocoder = GeocoderConfig::from_env()?;
        let coordinate_cache_capacity = parse_optional_env(
            "COORDINATE_CACHE_CAPACITY",
            DEFAULT_COORDINATE_CACHE_CAPACITY,
        )?;
        let json_logs = get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            geocoder,
            coordinate_cache_capacity,
            json_logs,
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

    /// Returns the geocoder configuration, if geocoding is enabled.
    #[must_use]
    pub const fn geocoder(&self) -> Option<&GeocoderConfig> {
        self.geocoder.as_ref()
    }

    /// Report whether geocoding is on. Call once a subscriber is installed.
    pub fn log_geocoder_state(&self) {
        let Some(geocoder) = &self.geocoder else {
            tracing::warn!("YANDEX_GEO_APIKEY not set, geocoding disabled");
            return;
        };
        if let Err(e) = geocoder.check_api_key() {
            tracing::warn!("YANDEX_GEO_APIKEY validation warning: {e}");
        }
        tracing::info!(base_url = %geocoder.base_url, "Geocoding enabled");
    }
}

impl GeocoderConfig {
    /// Check that the API key looks like a Yandex key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InsecureSecret`] for placeholders and other
    /// malformed keys.
    pub fn check_api_key(&self) -> Result<(), ConfigError> {
        check_api_key_shape(self.api_key.expose_secret())
    }

    /// Load geocoder configuration from environment.
    ///
    /// Returns `Ok(None)` if `YANDEX_GEO_APIKEY` is not set (geocoding disabled).
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = get_optional_env("YANDEX_GEO_APIKEY") else {
            return Ok(None);
        };

        let base_url = parse_base_url(&get_env_or_default(
            "GEOCODER_BASE_URL",
            DEFAULT_GEOCODER_BASE_URL,
        ))?;
        let timeout_secs =
            parse_optional_env("GEOCODER_TIMEOUT_SECS", DEFAULT_GEOCODER_TIMEOUT_SECS)?;

        Ok(Some(Self {
            api_key: SecretString::from(api_key),
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
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

/// Parse an optional numeric environment variable, rejecting garbage.
fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse and check the geocoder endpoint.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("GEOCODER_BASE_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "GEOCODER_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Yandex API keys are UUIDs: 32 hex digits grouped 8-4-4-4-12.
///
/// Anything else is most likely a copy-paste slip or a placeholder. Callers
/// only warn, since the geocoder is the final judge.
fn check_api_key_shape(key: &str) -> Result<(), ConfigError> {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    let groups: Vec<&str> = key.trim().split('-').collect();
    let well_formed = groups.len() == GROUPS.len()
        && groups
            .iter()
            .zip(GROUPS)
            .all(|(group, len)| group.len() == len && group.chars().all(|c| c.is_ascii_hexdigit()));

    if well_formed {
        Ok(())
    } else {
        Err(ConfigError::InsecureSecret(
            "YANDEX_GEO_APIKEY".to_string(),
            "expected a key of the form xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_shape_accepts_uuid() {
        assert!(check_api_key_shape("3f5c2b1a-9d8e-4f7a-b6c5-0e1d2c3b4a59").is_ok());
        assert!(check_api_key_shape(" 3F5C2B1A-9D8E-4F7A-B6C5-0E1D2C3B4A59\n").is_ok());
    }

    #[test]
    fn test_api_key_shape_rejects_placeholders() {
        for key in ["", "your-yandex-key", "changeme", "3f5c2b1a9d8e4f7ab6c50e1d2c3b4a59"] {
            assert!(
                matches!(check_api_key_shape(key), Err(ConfigError::InsecureSecret(_, _))),
                "accepted {key:?}"
            );
        }
        assert!(check_api_key_shape("3f5c2b1a-9d8e-4f7a-b6c5-0e1d2c3b4a5z").is_err());
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("https://geocode-maps.yandex.ru/1.x").is_ok());
        assert!(matches!(
            parse_base_url("ftp://geocode-maps.yandex.ru/1.x"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_parse_optional_env_default_when_unset() {
        let value: u64 = parse_optional_env("STAR_BURGER_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_socket_addr() {
        let config = RestaurateurConfig {
            database_url: SecretString::from("postgres://localhost/star_burger".to_owned()),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            geocoder: None,
            coordinate_cache_capacity: DEFAULT_COORDINATE_CACHE_CAPACITY,
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
        assert!(config.geocoder().is_none());
    }

    #[test]
    fn test_geocoder_config_checks_key() {
        let mut geocoder = GeocoderConfig {
            api_key: SecretString::from("3f5c2b1a-9d8e-4f7a-b6c5-0e1d2c3b4a59".to_owned()),
            base_url: parse_base_url(DEFAULT_GEOCODER_BASE_URL).unwrap(),
            timeout: Duration::from_secs(DEFAULT_GEOCODER_TIMEOUT_SECS),
        };
        assert!(geocoder.check_api_key().is_ok());

        geocoder.api_key = SecretString::from("changeme".to_owned());
        assert!(matches!(
            geocoder.check_api_key(),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }
}
