//! Fixed-window throttle counters.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Counter for one throttle key, tagged with the window it counts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleWindow {
    /// `floor(now / window)` at the time the window was adopted
    pub index: i64,
    pub count: u32,
}

impl ThrottleWindow {
    pub fn new(index: i64) -> Self {
        Self { index, count: 0 }
    }

    /// Count one request in window `index`, first resetting if the stored
    /// window is stale. Returns the count including this request.
    pub fn record_hit(&mut self, index: i64) -> u32 {
        if self.index != index {
            self.index = index;
            self.count = 0;
        }
        self.count = self.count.saturating_add(1);
        self.count
    }
}

/// Where an instant falls on the fixed-window grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPosition {
    pub index: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WindowPosition {
    /// Locate `now` on a grid of `window`-long buckets anchored at the epoch
    pub fn locate(now: DateTime<Utc>, window: Duration) -> Self {
        let window_ms = window.num_milliseconds().max(1);
        let index = now.timestamp_millis().div_euclid(window_ms);
        let start_ms = index * window_ms;
        let start = DateTime::from_timestamp_millis(start_ms).unwrap_or_default();
        Self {
            index,
            start,
            end: start + Duration::milliseconds(window_ms),
        }
    }

    /// Whole seconds until the window resets, rounded up and never below one
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> u64 {
        let remaining_ms = (self.end - now).num_milliseconds().max(1);
        ((remaining_ms + 999) / 1000) as u64
    }
}
