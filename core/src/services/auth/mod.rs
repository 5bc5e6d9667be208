//! Authentication service module
//!
//! This module ties the login flow together:
//! - Password check against the user directory
//! - Two-factor challenge start and completion
//! - Session token issuance and refresh

mod email_utils;
mod password;
mod service;

#[cfg(test)]
mod tests;

pub use email_utils::{mask_email, normalize_email};
pub use password::{BcryptVerifier, PasswordVerifier};
pub use service::{AuthService, LoginChallenge};
