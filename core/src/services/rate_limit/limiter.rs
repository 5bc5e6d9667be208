//! Fixed-window rate limiter

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use ts_shared::RateLimitConfig;

use crate::clock::Clock;
use crate::domain::entities::throttle::WindowPosition;
use crate::errors::DomainError;

use super::traits::ThrottleStore;

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RateLimitDecision {
    Allowed { remaining: u32, limit: u32 },
    Denied { retry_after_seconds: u64, limit: u32 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Counts requests per key in discrete, non-overlapping windows
pub struct RateLimiter {
    store: Arc<dyn ThrottleStore>,
    clock: Arc<dyn Clock>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn ThrottleStore>,
        clock: Arc<dyn Clock>,
        config: RateLimitConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
        })
    }

    /// Count a request against `key` and decide whether it may proceed.
    ///
    /// Denied requests still consume quota.
    pub async fn allow(&self, key: &str) -> Result<RateLimitDecision, DomainError> {
        let limit = self.config.max_requests;
        if !self.config.enabled {
            return Ok(RateLimitDecision::Allowed {
                remaining: limit,
                limit,
            });
        }

        let now = self.clock.now();
        let window = chrono::Duration::seconds(self.config.window_seconds as i64);
        let position = WindowPosition::locate(now, window);

        let count = self
            .store
            .hit(key, position.index, Duration::from_secs(self.config.window_seconds))
            .await?;

        if count > limit {
            let retry_after_seconds = position.retry_after_seconds(now);
            tracing::warn!(
                key = %key,
                count,
                limit,
                retry_after_seconds,
                event = "rate_limit_exceeded",
                "Rate limit exceeded"
            );
            return Ok(RateLimitDecision::Denied {
                retry_after_seconds,
                limit,
            });
        }

        Ok(RateLimitDecision::Allowed {
            remaining: limit - count,
            limit,
        })
    }

    /// Clear the counter for `key`
    pub async fn reset(&self, key: &str) -> Result<(), DomainError> {
        self.store.reset(key).await
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}
