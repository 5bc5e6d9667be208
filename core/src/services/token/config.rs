//! Configuration for the token service

use chrono::Duration;
use jsonwebtoken::Algorithm;
use ts_shared::{ConfigError, JwtConfig};

use crate::domain::entities::token::TokenKind;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds
    pub access_token_ttl_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_seconds: i64,
    /// Lifetime of the token linking a login to its pending challenge, seconds
    pub two_factor_pending_ttl_seconds: i64,
}

impl TokenServiceConfig {
    /// HS256 configuration with the default lifetimes (15 minutes / 7 days).
    /// There is no default secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            access_token_ttl_seconds: 15 * 60,
            refresh_token_ttl_seconds: 7 * 24 * 60 * 60,
            two_factor_pending_ttl_seconds: 10 * 60,
        }
    }

    /// Match the pending-login token to the challenge lifetime
    pub fn with_two_factor_pending_ttl(mut self, seconds: i64) -> Self {
        self.two_factor_pending_ttl_seconds = seconds;
        self
    }

    /// Lifetime for a token of `kind`
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => Duration::seconds(self.access_token_ttl_seconds),
            TokenKind::Refresh => Duration::seconds(self.refresh_token_ttl_seconds),
            TokenKind::TwoFactorPending => Duration::seconds(self.two_factor_pending_ttl_seconds),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.two_factor_pending_ttl_seconds <= 0 {
            return Err(ConfigError::invalid(
                "TWO_FACTOR_CODE_TTL_SECONDS",
                "must be a positive number of seconds",
            ));
        }
        JwtConfig {
            secret: self.jwt_secret.clone(),
            access_token_expiry: self.access_token_ttl_seconds,
            refresh_token_expiry: self.refresh_token_ttl_seconds,
        }
        .validate()
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(jwt: &JwtConfig) -> Self {
        Self {
            jwt_secret: jwt.secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_ttl_seconds: jwt.access_token_expiry,
            refresh_token_ttl_seconds: jwt.refresh_token_expiry,
            two_factor_pending_ttl_seconds: 10 * 60,
        }
    }
}
