//! Counter store abstraction for the rate limiter

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::DomainError;

/// Shared per-key counters
#[async_trait]
pub trait ThrottleStore: Send + Sync {
    /// Record one request for `key` in window `window_index`.
    ///
    /// If the stored window differs from `window_index` the count restarts at
    /// zero before incrementing. Reset, increment and read must happen as one
    /// atomic step with respect to other callers on the same key. `window` is
    /// the window length, usable as a storage TTL.
    ///
    /// Returns the count in the window including this request.
    async fn hit(&self, key: &str, window_index: i64, window: Duration) -> Result<u32, DomainError>;

    /// Forget the counter for `key`
    async fn reset(&self, key: &str) -> Result<(), DomainError>;
}
