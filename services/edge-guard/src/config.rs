//! Type-Safe Configuration with Validation
//!
//! Loads service configuration from environment variables and rejects
//! settings that would make the guard redirect in a loop.

use std::str::FromStr;

use http::HeaderValue;
use rust_common::env::{self, EnvError, EnvLookup, ProcessEnv};
use session_bridge::{RouteClass, RoutePolicy};
use thiserror::Error;
use url::Url;

use crate::guard::ProviderCookiePolicy;

/// Configuration errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Variable name
        field: String,
        /// Parser message
        reason: String,
    },

    /// Invalid port number
    #[error("Invalid port: must be between 1 and 65535")]
    InvalidPort,

    /// Invalid timeout value
    #[error("Invalid timeout for {0}: must be greater than 0")]
    InvalidTimeout(String),

    /// Redirect target is not a usable absolute path
    #[error("Invalid path for {field}: {reason}")]
    InvalidPath {
        /// Variable name
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Redirect target is classified so that the guard would bounce it
    #[error("{field} must be a {expected} path, got {actual}")]
    LoopingTarget {
        /// Variable name
        field: String,
        /// Required classification
        expected: RouteClass,
        /// Actual classification
        actual: RouteClass,
    },

    /// Unknown provider cookie mode
    #[error("Unknown provider cookie mode: {0}")]
    UnknownCookieMode(String),

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error(transparent)]
    Env(#[from] EnvError),
}

/// How provider-issued session cookies are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderCookieMode {
    /// Name pattern match on provider marker plus `token`
    #[default]
    Heuristic,
    /// Exact names from `PROVIDER_COOKIE_NAMES`
    Exact,
}

impl FromStr for ProviderCookieMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "exact" => Ok(Self::Exact),
            other => Err(ConfigError::UnknownCookieMode(other.to_string())),
        }
    }
}

/// Service configuration with validation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port (1-65535)
    pub port: u16,
    /// Application the guard forwards allowed requests to
    pub upstream_url: Url,
    /// Where unauthenticated users are sent
    pub auth_entry_path: String,
    /// Where authenticated users are sent from auth pages
    pub protected_landing_path: String,
    /// Provider cookie recognition mode
    pub provider_cookie_mode: ProviderCookieMode,
    /// Exact provider cookie names (required in exact mode)
    pub provider_cookie_names: Vec<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
    /// Largest request body forwarded upstream, in bytes
    pub max_body_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables with validation.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable does not parse or the
    /// resulting configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(&ProcessEnv)
    }

    /// Loads configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(vars: &impl EnvLookup) -> Result<Self, ConfigError> {
        let upstream = env::string_or(vars, "UPSTREAM_URL", "http://localhost:3000");
        let config = Self {
            host: env::string_or(vars, "HOST", "0.0.0.0"),
            port: env::parse_or(vars, "PORT", 8080)?,
            upstream_url: Url::parse(&upstream).map_err(|e| ConfigError::InvalidUrl {
                field: "UPSTREAM_URL".to_string(),
                reason: e.to_string(),
            })?,
            auth_entry_path: env::string_or(vars, "AUTH_ENTRY_PATH", "/login"),
            protected_landing_path: env::string_or(vars, "PROTECTED_LANDING_PATH", "/dashboard"),
            provider_cookie_mode: env::string_or(vars, "PROVIDER_COOKIE_MODE", "heuristic").parse()?,
            provider_cookie_names: env::list(vars, "PROVIDER_COOKIE_NAMES"),
            request_timeout_secs: env::parse_or(vars, "REQUEST_TIMEOUT", 30)?,
            shutdown_timeout_secs: env::parse_or(vars, "SHUTDOWN_TIMEOUT", 30)?,
            max_body_bytes: env::parse_or(vars, "MAX_BODY_BYTES", 16 * 1024 * 1024)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("REQUEST_TIMEOUT".to_string()));
        }
        if self.shutdown_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("SHUTDOWN_TIMEOUT".to_string()));
        }
        if !matches!(self.upstream_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                field: "UPSTREAM_URL".to_string(),
                reason: format!("unsupported scheme {}", self.upstream_url.scheme()),
            });
        }

        let policy = RoutePolicy::default();
        check_target(
            &policy,
            "AUTH_ENTRY_PATH",
            &self.auth_entry_path,
            RouteClass::Auth,
        )?;
        check_target(
            &policy,
            "PROTECTED_LANDING_PATH",
            &self.protected_landing_path,
            RouteClass::Protected,
        )?;

        if self.provider_cookie_mode == ProviderCookieMode::Exact
            && self.provider_cookie_names.is_empty()
        {
            return Err(ConfigError::MissingRequired(
                "PROVIDER_COOKIE_NAMES".to_string(),
            ));
        }
        Ok(())
    }

    /// Route policy with the configured redirect targets.
    #[must_use]
    pub fn route_policy(&self) -> RoutePolicy {
        RoutePolicy::default()
            .with_auth_entry(&self.auth_entry_path)
            .with_protected_landing(&self.protected_landing_path)
    }

    /// Provider cookie recognition policy.
    #[must_use]
    pub fn cookie_policy(&self) -> ProviderCookiePolicy {
        match self.provider_cookie_mode {
            ProviderCookieMode::Heuristic => ProviderCookiePolicy::heuristic(),
            ProviderCookieMode::Exact => {
                ProviderCookiePolicy::exact(self.provider_cookie_names.clone())
            }
        }
    }

    /// Socket address string for the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A redirect target must be a plain absolute path, representable as a
/// header value, and land on the class that the guard lets through for the
/// signal state that sent the user there.
fn check_target(
    policy: &RoutePolicy,
    field: &str,
    path: &str,
    expected: RouteClass,
) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidPath {
        field: field.to_string(),
        reason: reason.to_string(),
    };
    if !path.starts_with('/') || path.starts_with("//") {
        return Err(invalid("must be an absolute path"));
    }
    if path.contains(['?', '#']) {
        return Err(invalid("must not carry a query or fragment"));
    }
    if HeaderValue::from_str(path).is_err() {
        return Err(invalid("contains characters not allowed in a header"));
    }
    let actual = policy.classify(path);
    if actual != expected {
        return Err(ConfigError::LoopingTarget {
            field: field.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
