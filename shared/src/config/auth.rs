//! Authentication configuration: token signing, token lifetimes and cookies

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Environment variable holding the token signing secret
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens. Never defaulted.
    pub secret: String,

    /// Access token expiry time in seconds
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    /// Create a new JWT configuration with secret and default lifetimes
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiry: default_access_expiry(),
            refresh_token_expiry: default_refresh_expiry(),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Reject an empty secret and non-positive lifetimes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret {
                variable: JWT_SECRET_VAR.to_string(),
            });
        }
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::invalid(
                "JWT_ACCESS_TOKEN_EXPIRY",
                "must be a positive number of seconds",
            ));
        }
        if self.refresh_token_expiry <= self.access_token_expiry {
            return Err(ConfigError::invalid(
                "JWT_REFRESH_TOKEN_EXPIRY",
                "must be longer than the access token expiry",
            ));
        }
        Ok(())
    }
}

/// Names and attributes of the cookies carrying credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    /// Cookie holding the access token
    pub access_cookie: String,

    /// Cookie holding the refresh token
    pub refresh_cookie: String,

    /// Cookie holding the signed token for a pending two-factor challenge
    pub pending_two_factor_cookie: String,

    /// Secure flag (HTTPS only)
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_cookie: String::from("access_token"),
            refresh_cookie: String::from("refresh_token"),
            pending_two_factor_cookie: String::from("two_factor_pending"),
            secure: false,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Cookie configuration
    #[serde(default)]
    pub cookies: CookieConfig,
}

impl AuthConfig {
    /// Create from environment variables.
    ///
    /// A missing or empty `JWT_SECRET` is a configuration error; there is no
    /// fallback secret.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var(JWT_SECRET_VAR).unwrap_or_default();
        let access_token_expiry = super::parse_env("JWT_ACCESS_TOKEN_EXPIRY", default_access_expiry())?;
        let refresh_token_expiry = super::parse_env("JWT_REFRESH_TOKEN_EXPIRY", default_refresh_expiry())?;

        let jwt = JwtConfig {
            secret,
            access_token_expiry,
            refresh_token_expiry,
        };
        jwt.validate()?;

        let cookies = CookieConfig {
            secure: super::parse_env("COOKIE_SECURE", false)?,
            ..Default::default()
        };

        Ok(Self { jwt, cookies })
    }
}

fn default_access_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_expiry() -> i64 {
    604800 // 7 days
}
