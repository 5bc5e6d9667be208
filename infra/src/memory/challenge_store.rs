//! `DashMap`-backed two-factor challenge store

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use ts_core::domain::entities::two_factor::TwoFactorRecord;
use ts_core::errors::DomainError;
use ts_core::services::two_factor::ChallengeStore;

/// One record per subject. Compare-and-swap holds the shard lock for the
/// whole compare and write.
#[derive(Debug, Default)]
pub struct MemoryChallengeStore {
    records: DashMap<String, TwoFactorRecord>,
}

impl MemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeStore for MemoryChallengeStore {
    async fn load(&self, subject: &str) -> Result<Option<TwoFactorRecord>, DomainError> {
        Ok(self.records.get(subject).map(|record| record.clone()))
    }

    async fn replace(&self, record: TwoFactorRecord) -> Result<(), DomainError> {
        self.records.insert(record.subject.clone(), record);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        expected: &TwoFactorRecord,
        next: Option<TwoFactorRecord>,
    ) -> Result<bool, DomainError> {
        match self.records.entry(expected.subject.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get() != expected {
                    return Ok(false);
                }
                match next {
                    Some(record) => {
                        occupied.insert(record);
                    }
                    None => {
                        occupied.remove();
                    }
                }
                Ok(true)
            }
            Entry::Vacant(_) => Ok(false),
        }
    }
}
