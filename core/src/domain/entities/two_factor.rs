//! Two-factor challenge record and its state transitions.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TwoFactorError;

/// Lifecycle of a challenge.
///
/// `Pending` is the only state that accepts submissions. `Verified`,
/// `Expired` and `Locked` are terminal; only a fresh `start` replaces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeState {
    Pending,
    Verified,
    Expired,
    Locked,
}

/// A pending or finished two-factor challenge for one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFactorRecord {
    /// Distinguishes successive challenges for the same subject
    pub id: Uuid,

    pub subject: String,

    /// Plaintext code; never logged
    pub code: String,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    pub attempts_remaining: u32,

    pub state: ChallengeState,
}

/// What has to happen to the stored record after a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordUpdate {
    /// Leave the store untouched
    Keep,
    /// Swap the stored record for this one
    Replace(TwoFactorRecord),
    /// Delete the stored record
    Remove,
}

/// Result of evaluating one code submission against a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub update: RecordUpdate,
    pub outcome: Result<(), TwoFactorError>,
}

impl TwoFactorRecord {
    /// Creates a fresh pending challenge
    ///
    /// # Arguments
    ///
    /// * `subject` - The user the challenge belongs to
    /// * `code` - The code that will be emailed
    /// * `now` - Creation instant
    /// * `ttl` - Lifetime of the challenge
    /// * `max_attempts` - Submissions allowed before lockout
    pub fn new(
        subject: impl Into<String>,
        code: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            code: code.into(),
            created_at: now,
            expires_at: now + ttl,
            attempts_remaining: max_attempts,
            state: ChallengeState::Pending,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// State as observed at `now`. A pending record past its lifetime reads as expired
    /// even before a submission has persisted the transition.
    pub fn state_at(&self, now: DateTime<Utc>) -> ChallengeState {
        if self.state == ChallengeState::Pending && self.is_expired_at(now) {
            ChallengeState::Expired
        } else {
            self.state
        }
    }

    /// Evaluates a submitted code without mutating the record.
    ///
    /// Only pending records accept submissions; anything else is reported as
    /// no active challenge and leaves the store alone. The code comparison runs
    /// in constant time.
    pub fn evaluate(&self, submitted: &str, now: DateTime<Utc>) -> Submission {
        if self.state != ChallengeState::Pending {
            return Submission {
                update: RecordUpdate::Keep,
                outcome: Err(TwoFactorError::NoActiveChallenge),
            };
        }

        if self.is_expired_at(now) {
            return Submission {
                update: RecordUpdate::Replace(self.with_state(ChallengeState::Expired)),
                outcome: Err(TwoFactorError::ChallengeExpired),
            };
        }

        if constant_time_eq(self.code.as_bytes(), submitted.as_bytes()) {
            return Submission {
                update: RecordUpdate::Remove,
                outcome: Ok(()),
            };
        }

        let mut next = self.clone();
        next.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        if next.attempts_remaining == 0 {
            next.state = ChallengeState::Locked;
            Submission {
                update: RecordUpdate::Replace(next),
                outcome: Err(TwoFactorError::AttemptsExceeded),
            }
        } else {
            let attempts_remaining = next.attempts_remaining;
            Submission {
                update: RecordUpdate::Replace(next),
                outcome: Err(TwoFactorError::InvalidCode { attempts_remaining }),
            }
        }
    }

    fn with_state(&self, state: ChallengeState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}
