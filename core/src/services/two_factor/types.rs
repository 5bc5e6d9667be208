//! Result types for the two-factor challenge

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Returned by a successful `start`. Never carries the code itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeIssued {
    pub challenge_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub attempts_remaining: u32,
    /// Whether the email channel accepted the code. A pending challenge exists
    /// either way.
    pub delivered: bool,
}
