//! Error types for each admission concern
//!
//! Messages are deliberately generic: none of them reveals whether a subject
//! exists or what a stored code looks like.

use thiserror::Error;

use crate::domain::entities::token::TokenKind;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; the two cases are indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Missing access token")]
    Missing,

    /// Bad signature, or not a well-formed token at all
    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token kind mismatch: expected {expected}, got {actual}")]
    WrongKind { expected: TokenKind, actual: TokenKind },

    #[error("Token generation failed")]
    GenerationFailed,
}

/// Two-factor challenge errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TwoFactorError {
    #[error("No active two-factor challenge")]
    NoActiveChallenge,

    #[error("Two-factor code expired")]
    ChallengeExpired,

    #[error("Invalid two-factor code, {attempts_remaining} attempt(s) remaining")]
    InvalidCode { attempts_remaining: u32 },

    /// Terminal: the caller has to log in again
    #[error("Maximum two-factor attempts exceeded")]
    AttemptsExceeded,
}

/// Header validation errors. The payload is the message surfaced to the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("{message}")]
    MissingHeader { message: String },

    #[error("{message}")]
    InvalidHeaderValue { message: String },
}

/// Rate limiting errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Too many requests, retry after {retry_after_seconds} seconds")]
    Exceeded { retry_after_seconds: u64, limit: u32 },
}
