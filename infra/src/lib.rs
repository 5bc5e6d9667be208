//! # Infrastructure Layer
//!
//! Concrete implementations of the stores and channels the core depends on.
//!
//! ## Architecture
//!
//! - **Memory**: `DashMap`-backed throttle and challenge stores for a single process
//! - **Cache**: Redis client plus Redis-backed stores shared across instances
//! - **Email**: delivery channels for two-factor codes
//!
//! ## Features
//!
//! - `redis-cache`: Enable Redis-backed stores (default)

use ts_core::errors::DomainError;

/// Cache module - Redis client and Redis-backed stores
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Email delivery channels
pub mod email;

/// In-process stores
pub mod memory;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Stored data could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Email delivery error
    #[error("Email error: {0}")]
    Email(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}
