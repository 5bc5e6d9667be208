//! Token entities for cookie-carried JWT sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Distinguishes short-lived access tokens from long-lived refresh tokens,
/// and both from the token that links a password check to its pending
/// two-factor challenge. A token of one kind is never accepted where another
/// is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    TwoFactorPending,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::TwoFactorPending => "two_factor_pending",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the authenticated user's id)
    pub sub: String,

    /// Issued at, unix seconds
    pub iat: i64,

    /// Expiration, unix seconds
    pub exp: i64,

    pub kind: TokenKind,

    /// Unique token id; two tokens minted in the same second still differ
    pub jti: String,

    /// Challenge a two-factor pending token is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
}

impl Claims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// A token is dead at and after its expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Access and refresh tokens issued together after a completed login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds
    pub access_expires_in: i64,
    /// Lifetime of the refresh token in seconds
    pub refresh_expires_in: i64,
}

/// Subject and challenge recovered from a valid pending-login token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLogin {
    pub subject: String,
    pub challenge_id: Uuid,
}

/// Identity attached to a request once its access token has been validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub subject: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        let expires_at = claims.expires_at();
        Self {
            subject: claims.sub,
            token_id: claims.jti,
            expires_at,
        }
    }
}
