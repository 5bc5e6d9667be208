//! `DashMap`-backed throttle counters

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;

use ts_core::domain::entities::throttle::ThrottleWindow;
use ts_core::errors::DomainError;
use ts_core::services::rate_limit::ThrottleStore;

/// Counters are updated under the map's per-shard write lock, which makes
/// reset-then-increment atomic per key.
#[derive(Debug, Default)]
pub struct MemoryThrottleStore {
    windows: DashMap<String, ThrottleWindow>,
}

impl MemoryThrottleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop counters from windows older than `current_index`.
    /// Returns how many were removed.
    pub fn sweep(&self, current_index: i64) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| window.index >= current_index);
        before.saturating_sub(self.windows.len())
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[async_trait]
impl ThrottleStore for MemoryThrottleStore {
    async fn hit(&self, key: &str, window_index: i64, _window: Duration) -> Result<u32, DomainError> {
        let mut window = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| ThrottleWindow::new(window_index));
        Ok(window.record_hit(window_index))
    }

    async fn reset(&self, key: &str) -> Result<(), DomainError> {
        self.windows.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_hit_counts_and_resets_on_new_window() {
        let store = MemoryThrottleStore::new();

        assert_eq!(store.hit("k", 5, WINDOW).await.unwrap(), 1);
        assert_eq!(store.hit("k", 5, WINDOW).await.unwrap(), 2);
        assert_eq!(store.hit("k", 6, WINDOW).await.unwrap(), 1);

        store.reset("k").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_drops_stale_windows() {
        let store = MemoryThrottleStore::new();
        store.hit("old", 1, WINDOW).await.unwrap();
        store.hit("new", 2, WINDOW).await.unwrap();

        assert_eq!(store.sweep(2), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_hits_lose_nothing() {
        let store = Arc::new(MemoryThrottleStore::new());

        let handles: Vec<_> = (0..200)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.hit("shared", 7, WINDOW).await.unwrap() })
            })
            .collect();

        let mut counts = Vec::new();
        for handle in handles {
            counts.push(handle.await.unwrap());
        }
        counts.sort_unstable();

        // Every increment observed exactly once
        assert_eq!(counts, (1..=200).collect::<Vec<u32>>());
    }
}
