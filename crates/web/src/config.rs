//! Web configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_URL` - Base URL of the backend API (absolute http/https URL)
//!
//! ## Optional
//! - `DETAILER_HOST` - Bind address (default: 127.0.0.1)
//! - `DETAILER_PORT` - Listen port (default: 3000)
//! - `DETAILER_BASE_URL` - Public URL of the site (default: <http://localhost:3000>)
//! - `DETAILER_RESERVED_SUBDOMAINS` - Comma-separated labels that never name a
//!   tenant (default: www,app)
//! - `DETAILER_DEV_SUBDOMAIN_PARAM` - Query parameter carrying the tenant on
//!   loopback hosts (default: subdomain)
//! - `BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use detailer_core::DEFAULT_RESERVED_LABELS;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Backend API configuration
    pub backend: BackendConfig,
    /// Tenant resolution settings
    pub tenancy: TenancyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, always ending in `/` so relative joins keep its path.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Tenant resolution settings.
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    /// Leading host labels that never name a tenant (lower-case).
    pub reserved_subdomains: Vec<String>,
    /// Query parameter carrying the subdomain on loopback hosts.
    pub dev_subdomain_param: String,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            reserved_subdomains: DEFAULT_RESERVED_LABELS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            dev_subdomain_param: "subdomain".to_string(),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `BACKEND_URL` is missing or any variable is
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`WebConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let host = vars
            .get_or_default("DETAILER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DETAILER_HOST".to_string(), e.to_string()))?;
        let port = vars
            .get_or_default("DETAILER_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DETAILER_PORT".to_string(), e.to_string()))?;
        let base_url = vars.get_or_default("DETAILER_BASE_URL", "http://localhost:3000");

        let backend = BackendConfig::from_vars(&vars)?;
        let tenancy = TenancyConfig::from_vars(&vars)?;

        Ok(Self {
            host,
            port,
            base_url,
            backend,
            tenancy,
            sentry_dsn: vars.get("SENTRY_DSN").map(SecretString::from),
            sentry_environment: vars.get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    /// Create a backend configuration with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_backend_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
        })
    }

    fn from_vars(vars: &Vars<'_>) -> Result<Self, ConfigError> {
        let raw = vars
            .get("BACKEND_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("BACKEND_URL".to_string()))?;
        let timeout_secs = vars
            .get_or_default("BACKEND_TIMEOUT_SECS", &DEFAULT_BACKEND_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BACKEND_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url: parse_backend_url(&raw)?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl TenancyConfig {
    fn from_vars(vars: &Vars<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let reserved_subdomains = match vars.get("DETAILER_RESERVED_SUBDOMAINS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.reserved_subdomains,
        };

        let dev_subdomain_param = vars
            .get("DETAILER_DEV_SUBDOMAIN_PARAM")
            .unwrap_or(defaults.dev_subdomain_param);
        if dev_subdomain_param.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "DETAILER_DEV_SUBDOMAIN_PARAM".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            reserved_subdomains,
            dev_subdomain_param,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source wrapper shared by the section loaders.
struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    /// Get an optional variable.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// Parse the backend URL, requiring http(s) and normalizing a trailing `/`.
fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
