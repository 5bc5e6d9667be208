//! Collaborator traits for the two-factor challenge

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::two_factor::TwoFactorRecord;
use crate::errors::DomainError;

/// Store holding at most one challenge record per subject
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn load(&self, subject: &str) -> Result<Option<TwoFactorRecord>, DomainError>;

    /// Unconditionally store `record` under its subject, replacing anything there
    async fn replace(&self, record: TwoFactorRecord) -> Result<(), DomainError>;

    /// Atomically swap the stored record for `next` (or delete it when `next`
    /// is `None`), but only if the stored record still equals `expected`.
    ///
    /// Returns `false` without writing when the record changed underneath.
    async fn compare_and_swap(
        &self,
        expected: &TwoFactorRecord,
        next: Option<TwoFactorRecord>,
    ) -> Result<bool, DomainError>;
}

/// Outbound email used to deliver codes
#[async_trait]
pub trait EmailChannel: Send + Sync {
    /// Deliver `code` to `destination`. Returns a provider message id.
    async fn send_two_factor_code(
        &self,
        destination: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, String>;
}

/// Source of fresh codes
pub trait CodeGenerator: Send + Sync {
    /// A code of exactly `length` decimal digits
    fn generate(&self, length: usize) -> String;
}
