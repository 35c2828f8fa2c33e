//! Typed server configuration.
//!
//! The binary fills these from CLI flags and environment variables; the
//! library validates them once at startup. Everything here is immutable for
//! the lifetime of the process.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::auth::AllowList;
use crate::cache::RetryPolicy;
use crate::constants::{
    DEFAULT_BACKEND_TIMEOUT, DEFAULT_SESSION_MAX_AGE, DEFAULT_STALE_AFTER, MAX_SESSION_MAX_AGE,
};

/// Configuration errors. All of them are fatal at startup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No session secret was provided.
    #[error("Session secret is not set")]
    MissingSecret,

    /// The backend URL is unusable.
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    /// The backend URL points at a domain-restricted Apps Script deployment.
    #[error(
        "Backend URL '{url}' is a domain-restricted script; use the public https://script.google.com/macros/s/<id>/exec form"
    )]
    DomainRestrictedScript { url: String },

    /// A numeric or duration setting is out of range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Session signing settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub max_age: Duration,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>, max_age: Duration) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if max_age.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "session max age",
                reason: "must be greater than zero".to_string(),
            });
        }
        if max_age > MAX_SESSION_MAX_AGE {
            return Err(ConfigError::InvalidValue {
                field: "session max age",
                reason: format!(
                    "{} days exceeds the limit of {} days",
                    max_age.as_secs() / SECS_PER_DAY,
                    MAX_SESSION_MAX_AGE.as_secs() / SECS_PER_DAY
                ),
            });
        }
        Ok(Self {
            secret,
            max_age,
            secure_cookies: false,
        })
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}

/// Remote data backend settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl BackendConfig {
    /// Validate and store the Apps Script exec URL.
    pub fn parse(url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = Url::parse(url.trim()).map_err(|e| ConfigError::InvalidBackendUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBackendUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", base_url.scheme()),
            });
        }
        if base_url.path().contains("/a/macros/") {
            return Err(ConfigError::DomainRestrictedScript {
                url: url.to_string(),
            });
        }
        if timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "backend timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self { base_url, timeout })
    }
}

/// Fetch cache settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub stale_after: Duration,
    /// Return the last value while a stale entry refreshes in the background.
    pub serve_stale: bool,
    pub retry: RetryPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after: DEFAULT_STALE_AFTER,
            serve_stale: true,
            retry: RetryPolicy::default(),
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub session: SessionConfig,
    pub allow_list: AllowList,
    pub backend: BackendConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Configuration with defaults for everything but the secret and backend.
    pub fn new(secret: impl Into<String>, backend_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            session: SessionConfig::new(secret, DEFAULT_SESSION_MAX_AGE)?,
            allow_list: AllowList::default(),
            backend: BackendConfig::parse(backend_url, DEFAULT_BACKEND_TIMEOUT)?,
            cache: CacheConfig::default(),
        })
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}

/// Build a retry policy from a user-supplied retry count.
pub fn retry_policy(max_retries: u32) -> Result<RetryPolicy, ConfigError> {
    if max_retries > 10 {
        return Err(ConfigError::InvalidValue {
            field: "max retries",
            reason: format!("{max_retries} exceeds the limit of 10"),
        });
    }
    Ok(RetryPolicy {
        max_retries,
        ..RetryPolicy::default()
    })
}
