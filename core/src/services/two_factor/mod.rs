//! Emailed second-factor challenge
//!
//! This module handles:
//! - Issuing a code and committing the pending challenge before dispatch
//! - Attempt-limited, time-bounded code submission
//! - Optimistic compare-and-swap transitions against a shared store

mod code;
mod service;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use code::RandomCodeGenerator;
pub use service::TwoFactorChallenge;
pub use traits::{ChallengeStore, CodeGenerator, EmailChannel};
pub use types::ChallengeIssued;
