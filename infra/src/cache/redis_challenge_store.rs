//! Redis-backed two-factor challenge store

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use redis::Script;
use std::sync::Arc;
use std::time::Duration;

use ts_core::domain::entities::two_factor::TwoFactorRecord;
use ts_core::errors::DomainError;
use ts_core::services::two_factor::ChallengeStore;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// How long a finished challenge lingers after its expiry before Redis drops it
const TOMBSTONE_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Swap only if the stored JSON is byte-identical to the expected record.
/// KEYS[1] = record key, ARGV[1] = expected JSON, ARGV[2] = replacement JSON
/// (empty deletes), ARGV[3] = ttl in ms.
static SWAP_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local current = redis.call('GET', KEYS[1])
        if current ~= ARGV[1] then
            return 0
        end
        if ARGV[2] == '' then
            redis.call('DEL', KEYS[1])
        else
            redis.call('SET', KEYS[1], ARGV[2], 'PX', ARGV[3])
        end
        return 1
        "#,
    )
});

/// Challenge store keeping one JSON record per subject: `{prefix}:two_factor:{subject}`
pub struct RedisChallengeStore {
    client: Arc<RedisClient>,
}

impl RedisChallengeStore {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self { client }
    }

    fn record_key(&self, subject: &str) -> String {
        self.client.key(&format!("two_factor:{}", subject))
    }

    fn ttl_for(record: &TwoFactorRecord) -> Duration {
        let remaining = (record.expires_at - Utc::now()).to_std().unwrap_or_default();
        remaining + TOMBSTONE_RETENTION
    }

    fn encode(record: &TwoFactorRecord) -> Result<String, InfrastructureError> {
        Ok(serde_json::to_string(record)?)
    }
}

#[async_trait]
impl ChallengeStore for RedisChallengeStore {
    async fn load(&self, subject: &str) -> Result<Option<TwoFactorRecord>, DomainError> {
        let raw = self.client.get(&self.record_key(subject)).await?;
        match raw {
            Some(json) => {
                let record = serde_json::from_str(&json).map_err(InfrastructureError::from)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn replace(&self, record: TwoFactorRecord) -> Result<(), DomainError> {
        let json = Self::encode(&record)?;
        self.client
            .set_with_expiry(&self.record_key(&record.subject), &json, Self::ttl_for(&record))
            .await?;
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        expected: &TwoFactorRecord,
        next: Option<TwoFactorRecord>,
    ) -> Result<bool, DomainError> {
        let expected_json = Self::encode(expected)?;
        let (next_json, ttl) = match &next {
            Some(record) => (Self::encode(record)?, Self::ttl_for(record)),
            None => (String::new(), Duration::from_millis(1)),
        };

        let swapped: i64 = self
            .client
            .run_script(
                &SWAP_SCRIPT,
                &[self.record_key(&expected.subject)],
                &[expected_json, next_json, ttl.as_millis().max(1).to_string()],
            )
            .await?;
        Ok(swapped == 1)
    }
}
