//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing, token lifetimes and credential cookies
//! - `cache` - Optional Redis connection for shared counters
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - Fixed-window request quota
//! - `server` - HTTP server binding
//! - `two_factor` - Emailed second-factor code settings

pub mod auth;
pub mod cache;
pub mod environment;
pub mod rate_limit;
pub mod server;
pub mod two_factor;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ConfigError;

// Re-export commonly used types
pub use auth::{AuthConfig, CookieConfig, JwtConfig};
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
pub use two_factor::TwoFactorConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Redis configuration, absent for single-instance deployments
    #[serde(default)]
    pub cache: Option<CacheConfig>,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Two-factor configuration
    #[serde(default)]
    pub two_factor: TwoFactorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment.
    ///
    /// Fails on the first invalid or missing required value; callers should
    /// treat this as fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env()?;
        let mut rate_limit = RateLimitConfig::from_env()?;
        if environment.is_development() && std::env::var("RATE_LIMIT_MAX_REQUESTS").is_err() {
            rate_limit.max_requests = RateLimitConfig::development().max_requests;
        }

        Ok(Self {
            environment,
            server: ServerConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            cache: CacheConfig::from_env(),
            rate_limit,
            two_factor: TwoFactorConfig::from_env()?,
            logging: LoggingConfig::from_env(environment)?,
        })
    }
}

/// Parse an optional environment variable, falling back to `default` when unset
pub(crate) fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key, format!("cannot parse '{}'", raw))),
        Err(_) => Ok(default),
    }
}
