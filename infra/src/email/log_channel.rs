//! Log-only email channel
//!
//! Writes two-factor codes to the tracing output instead of sending mail.
//! Used in development and tests where no mail provider is configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use ts_core::services::auth::mask_email;
use ts_core::services::two_factor::EmailChannel;

/// Email channel that logs instead of delivering
#[derive(Clone, Default)]
pub struct LogEmailChannel {
    message_count: Arc<AtomicU64>,
    simulate_failure: Arc<AtomicBool>,
    /// Include the code itself in the log line
    reveal_codes: bool,
}

impl LogEmailChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the plaintext code too. Development only.
    pub fn revealing_codes() -> Self {
        Self {
            reveal_codes: true,
            ..Self::default()
        }
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmailChannel for LogEmailChannel {
    async fn send_two_factor_code(
        &self,
        destination: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, String> {
        let masked = mask_email(destination);

        if !destination.contains('@') {
            return Err(format!("Invalid email address: {}", masked));
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(destination = %masked, "Log email channel simulating failure");
            return Err("Simulated email delivery failure".to_string());
        }

        let message_id = format!("log_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.reveal_codes {
            info!(
                target: "email_channel",
                destination = %masked,
                message_id = %message_id,
                count = count,
                code = code,
                expires_at = %expires_at,
                "Two-factor code (log channel)"
            );
        } else {
            info!(
                target: "email_channel",
                destination = %masked,
                message_id = %message_id,
                count = count,
                expires_at = %expires_at,
                "Two-factor code sent (log channel)"
            );
        }

        Ok(message_id)
    }
}
