//! Two-factor challenge state machine

use std::sync::Arc;

use chrono::Duration;
use ts_shared::TwoFactorConfig;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::two_factor::{ChallengeState, RecordUpdate, TwoFactorRecord};
use crate::errors::{DomainError, DomainResult, TwoFactorError};

use super::traits::{ChallengeStore, CodeGenerator, EmailChannel};
use super::types::ChallengeIssued;

/// Lower bound on compare-and-swap attempts before a submission gives up
const MIN_SWAP_RETRIES: usize = 8;

/// Per-subject challenge tracking on top of a [`ChallengeStore`]
pub struct TwoFactorChallenge {
    store: Arc<dyn ChallengeStore>,
    email: Arc<dyn EmailChannel>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    config: TwoFactorConfig,
}

impl TwoFactorChallenge {
    pub fn new(
        store: Arc<dyn ChallengeStore>,
        email: Arc<dyn EmailChannel>,
        codes: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
        config: TwoFactorConfig,
    ) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            email,
            codes,
            clock,
            config,
        })
    }

    /// Issue a fresh code for `subject` and email it to `destination`
    ///
    /// Any existing record for the subject is replaced whatever its state.
    /// The pending record is committed before the email is attempted; a
    /// failed delivery is logged and reported through `delivered` but leaves
    /// the challenge pending.
    ///
    /// # Returns
    ///
    /// * `Ok(ChallengeIssued)` - The challenge is pending
    /// * `Err(DomainError)` - The store could not be written
    pub async fn start(&self, subject: &str, destination: &str) -> DomainResult<ChallengeIssued> {
        let now = self.clock.now();
        let code = self.codes.generate(self.config.code_length);
        let record = TwoFactorRecord::new(
            subject,
            code,
            now,
            Duration::seconds(self.config.code_ttl_seconds),
            self.config.max_attempts,
        );

        let challenge_id = record.id;
        let expires_at = record.expires_at;
        let attempts_remaining = record.attempts_remaining;
        let code = record.code.clone();

        self.store.replace(record).await.map_err(|e| {
            tracing::error!(
                subject = subject,
                error = %e,
                event = "two_factor_storage_failed",
                "Failed to store two-factor challenge"
            );
            e
        })?;

        tracing::info!(
            subject = subject,
            challenge_id = %challenge_id,
            event = "two_factor_started",
            "Issued two-factor challenge"
        );

        let delivered = match self
            .email
            .send_two_factor_code(destination, &code, expires_at)
            .await
        {
            Ok(message_id) => {
                tracing::debug!(
                    subject = subject,
                    message_id = %message_id,
                    "Two-factor code dispatched"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    subject = subject,
                    challenge_id = %challenge_id,
                    error = %e,
                    event = "two_factor_delivery_failed",
                    "Failed to email two-factor code; challenge left pending"
                );
                false
            }
        };

        Ok(ChallengeIssued {
            challenge_id,
            expires_at,
            attempts_remaining,
            delivered,
        })
    }

    /// Submit a code for `subject`'s pending challenge, returning `Verified` on a match
    ///
    /// The read-evaluate-write cycle is retried when a concurrent submission
    /// changed the record in between, so every attempt is counted exactly once.
    ///
    /// # Errors
    ///
    /// * `NoActiveChallenge` - no record, or the record is no longer pending
    /// * `ChallengeExpired` - the code outlived its lifetime
    /// * `InvalidCode` - wrong code, attempts remain
    /// * `AttemptsExceeded` - wrong code and no attempts remain
    pub async fn submit(&self, subject: &str, code: &str) -> DomainResult<ChallengeState> {
        self.submit_bound(subject, None, code).await
    }

    /// Like [`submit`](Self::submit), but only against the challenge `challenge_id`.
    ///
    /// A different challenge for the same subject reports `NoActiveChallenge`
    /// and keeps its attempts.
    pub async fn submit_for_challenge(
        &self,
        subject: &str,
        challenge_id: Uuid,
        code: &str,
    ) -> DomainResult<ChallengeState> {
        self.submit_bound(subject, Some(challenge_id), code).await
    }

    async fn submit_bound(
        &self,
        subject: &str,
        challenge_id: Option<Uuid>,
        code: &str,
    ) -> DomainResult<ChallengeState> {
        for _ in 0..self.swap_retries() {
            let current = self
                .store
                .load(subject)
                .await?
                .ok_or(TwoFactorError::NoActiveChallenge)?;

            if challenge_id.is_some_and(|id| id != current.id) {
                tracing::info!(
                    subject = subject,
                    event = "two_factor_rejected",
                    reason = "challenge superseded",
                    "Two-factor submission rejected"
                );
                return Err(TwoFactorError::NoActiveChallenge.into());
            }

            let submission = current.evaluate(code, self.clock.now());
            let committed = match submission.update {
                RecordUpdate::Keep => true,
                RecordUpdate::Replace(next) => self.store.compare_and_swap(&current, Some(next)).await?,
                RecordUpdate::Remove => self.store.compare_and_swap(&current, None).await?,
            };

            if !committed {
                tracing::debug!(subject = subject, "Challenge changed during submission, retrying");
                continue;
            }

            match &submission.outcome {
                Ok(()) => tracing::info!(
                    subject = subject,
                    challenge_id = %current.id,
                    event = "two_factor_verified",
                    "Two-factor challenge verified"
                ),
                Err(TwoFactorError::AttemptsExceeded) => tracing::warn!(
                    subject = subject,
                    challenge_id = %current.id,
                    event = "two_factor_locked",
                    "Two-factor challenge locked after too many attempts"
                ),
                Err(e) => tracing::info!(
                    subject = subject,
                    challenge_id = %current.id,
                    reason = %e,
                    event = "two_factor_rejected",
                    "Two-factor submission rejected"
                ),
            }

            return submission
                .outcome
                .map(|()| ChallengeState::Verified)
                .map_err(DomainError::from);
        }

        tracing::error!(
            subject = subject,
            event = "two_factor_contention",
            "Gave up on two-factor submission after repeated concurrent updates"
        );
        Err(DomainError::internal("two-factor challenge under contention"))
    }

    /// Each competing commit on one challenge either spends an attempt or
    /// ends the challenge, so `max_attempts + 2` rounds always reach a decision.
    fn swap_retries(&self) -> usize {
        MIN_SWAP_RETRIES.max(self.config.max_attempts as usize + 2)
    }

    /// Observable state of `subject`'s challenge, if a record exists.
    /// Verified records are deleted, so success reads as `None`.
    pub async fn state(&self, subject: &str) -> DomainResult<Option<ChallengeState>> {
        let now = self.clock.now();
        Ok(self
            .store
            .load(subject)
            .await?
            .map(|record| record.state_at(now)))
    }

    /// Attempts left on a pending challenge
    pub async fn attempts_remaining(&self, subject: &str) -> DomainResult<Option<u32>> {
        Ok(self
            .store
            .load(subject)
            .await?
            .filter(|record| record.state == ChallengeState::Pending)
            .map(|record| record.attempts_remaining))
    }

    pub fn config(&self) -> &TwoFactorConfig {
        &self.config
    }
}
