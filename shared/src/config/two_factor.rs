//! Two-factor challenge configuration

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Settings for the emailed second-factor code
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwoFactorConfig {
    /// Number of digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Wrong submissions allowed before the challenge locks
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Lifetime of an issued code in seconds
    #[serde(default = "default_code_ttl")]
    pub code_ttl_seconds: i64,
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            max_attempts: default_max_attempts(),
            code_ttl_seconds: default_code_ttl(),
        }
    }
}

impl TwoFactorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=10).contains(&self.code_length) {
            return Err(ConfigError::invalid(
                "TWO_FACTOR_CODE_LENGTH",
                "must be between 4 and 10 digits",
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "TWO_FACTOR_MAX_ATTEMPTS",
                "must allow at least one attempt",
            ));
        }
        if self.code_ttl_seconds <= 0 {
            return Err(ConfigError::invalid(
                "TWO_FACTOR_CODE_TTL_SECONDS",
                "must be a positive number of seconds",
            ));
        }
        Ok(())
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            code_length: super::parse_env("TWO_FACTOR_CODE_LENGTH", default_code_length())?,
            max_attempts: super::parse_env("TWO_FACTOR_MAX_ATTEMPTS", default_max_attempts())?,
            code_ttl_seconds: super::parse_env("TWO_FACTOR_CODE_TTL_SECONDS", default_code_ttl())?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn default_code_length() -> usize {
    6
}

fn default_max_attempts() -> u32 {
    3
}

fn default_code_ttl() -> i64 {
    600 // 10 minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TwoFactorConfig::default();
        assert_eq!(config.code_length, 6);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.code_ttl_seconds, 600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let config = TwoFactorConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TwoFactorConfig {
            code_length: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
