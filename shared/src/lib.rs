//! Shared utilities and common types for the Turnstile server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response envelope and error codes
//! - Configuration errors raised at startup

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, CookieConfig, Environment, JwtConfig, LogFormat,
    LoggingConfig, RateLimitConfig, ServerConfig, TwoFactorConfig,
};
pub use errors::{error_codes, ConfigError, ErrorResponse, IntoErrorResponse};
