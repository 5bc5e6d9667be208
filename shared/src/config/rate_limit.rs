//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Fixed-window rate limiting configuration shared by every route
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Max requests per key within one window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
        }
    }
}

impl RateLimitConfig {
    /// Create a configuration with an explicit quota
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            enabled: true,
            max_requests,
            window_seconds,
        }
    }

    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self::new(300, 60)
    }

    /// Reject quotas that would make the limiter meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests == 0 {
            return Err(ConfigError::invalid(
                "RATE_LIMIT_MAX_REQUESTS",
                "must allow at least one request per window",
            ));
        }
        if self.window_seconds == 0 {
            return Err(ConfigError::invalid(
                "RATE_LIMIT_WINDOW_SECONDS",
                "window must be at least one second",
            ));
        }
        Ok(())
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            enabled: super::parse_env("RATE_LIMIT_ENABLED", default_enabled())?,
            max_requests: super::parse_env("RATE_LIMIT_MAX_REQUESTS", default_max_requests())?,
            window_seconds: super::parse_env("RATE_LIMIT_WINDOW_SECONDS", default_window_seconds())?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    60
}

fn default_window_seconds() -> u64 {
    60
}
