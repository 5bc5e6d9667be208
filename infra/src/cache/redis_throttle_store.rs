//! Redis-backed throttle counters shared across server instances

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::Script;
use std::sync::Arc;
use std::time::Duration;

use ts_core::errors::DomainError;
use ts_core::services::rate_limit::ThrottleStore;

use super::redis_client::RedisClient;

/// Reset-if-stale, increment and refresh expiry as one server-side step.
/// KEYS[1] = counter hash, ARGV[1] = window index, ARGV[2] = ttl in ms.
static HIT_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local current = redis.call('HGET', KEYS[1], 'window')
        if current ~= ARGV[1] then
            redis.call('HSET', KEYS[1], 'window', ARGV[1], 'count', 0)
        end
        local count = redis.call('HINCRBY', KEYS[1], 'count', 1)
        redis.call('PEXPIRE', KEYS[1], ARGV[2])
        return count
        "#,
    )
});

/// Throttle store keeping one hash per key: `{prefix}:throttle:{key}`
pub struct RedisThrottleStore {
    client: Arc<RedisClient>,
}

impl RedisThrottleStore {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self { client }
    }

    fn counter_key(&self, key: &str) -> String {
        self.client.key(&format!("throttle:{}", key))
    }
}

#[async_trait]
impl ThrottleStore for RedisThrottleStore {
    async fn hit(&self, key: &str, window_index: i64, window: Duration) -> Result<u32, DomainError> {
        let ttl_ms = window.as_millis().max(1);
        let count: i64 = self
            .client
            .run_script(
                &HIT_SCRIPT,
                &[self.counter_key(key)],
                &[window_index.to_string(), ttl_ms.to_string()],
            )
            .await?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn reset(&self, key: &str) -> Result<(), DomainError> {
        self.client.delete(&self.counter_key(key)).await?;
        Ok(())
    }
}
