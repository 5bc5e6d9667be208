//! Main authentication service implementation

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, DomainResult, TokenError, TwoFactorError};
use crate::repositories::UserRepository;
use crate::services::token::TokenService;
use crate::services::two_factor::{ChallengeIssued, TwoFactorChallenge};

use super::email_utils::{mask_email, normalize_email};
use super::password::{BcryptVerifier, PasswordVerifier, DUMMY_HASH};

/// A password check that passed and is now waiting on the emailed code
#[derive(Debug, Clone, Serialize)]
pub struct LoginChallenge {
    pub subject: String,
    pub challenge: ChallengeIssued,
    /// Signed token binding the follow-up submission to this challenge
    #[serde(skip_serializing)]
    pub pending_token: String,
}

/// Authentication service for the password + emailed-code login flow
pub struct AuthService {
    /// Directory the password is checked against
    users: Arc<dyn UserRepository>,
    /// Second factor
    two_factor: Arc<TwoFactorChallenge>,
    /// Session tokens
    tokens: Arc<TokenService>,
    passwords: Arc<dyn PasswordVerifier>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        two_factor: Arc<TwoFactorChallenge>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            two_factor,
            tokens,
            passwords: Arc::new(BcryptVerifier),
        }
    }

    /// Replace the bcrypt verifier
    pub fn with_password_verifier(mut self, passwords: Arc<dyn PasswordVerifier>) -> Self {
        self.passwords = passwords;
        self
    }

    /// Check the password and, on success, start a two-factor challenge
    ///
    /// Unknown emails and wrong passwords produce the same error.
    ///
    /// # Arguments
    ///
    /// * `email` - Login email
    /// * `password` - Plaintext password
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<LoginChallenge> {
        let email = normalize_email(email);
        let user = self.users.find_by_email(&email).await?;

        // An unknown email still pays for one bcrypt check
        let hash = user
            .as_ref()
            .map(|user| user.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.clone());
        let passwords = Arc::clone(&self.passwords);
        let password = password.to_string();
        let password_ok = tokio::task::spawn_blocking(move || passwords.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("password check aborted: {}", e)))?;

        let user = match user {
            Some(user) if password_ok => user,
            _ => {
                tracing::info!(
                    email = %mask_email(&email),
                    event = "login_failed",
                    "Login rejected"
                );
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let subject = user.subject();
        let challenge = self.two_factor.start(&subject, &user.email).await?;

        tracing::info!(
            subject = %subject,
            email = %mask_email(&user.email),
            delivered = challenge.delivered,
            event = "login_password_verified",
            "Password verified, awaiting two-factor code"
        );

        let pending_token = self
            .tokens
            .issue_two_factor_pending(&subject, challenge.challenge_id)?;

        Ok(LoginChallenge {
            subject,
            challenge,
            pending_token,
        })
    }

    /// Submit the emailed code for the login named by `pending_token` and,
    /// once verified, issue the session tokens.
    ///
    /// A pending token that does not verify never touches the challenge: a
    /// lapsed one reports `ChallengeExpired`, anything else `NoActiveChallenge`.
    pub async fn complete_two_factor(&self, pending_token: &str, code: &str) -> DomainResult<TokenPair> {
        let pending = self
            .tokens
            .validate_two_factor_pending(pending_token)
            .map_err(|e| match e {
                TokenError::Expired => TwoFactorError::ChallengeExpired,
                _ => TwoFactorError::NoActiveChallenge,
            })?;

        self.two_factor
            .submit_for_challenge(&pending.subject, pending.challenge_id, code)
            .await?;
        let pair = self.tokens.issue_pair(&pending.subject)?;

        tracing::info!(
            subject = %pending.subject,
            event = "login_completed",
            "Session tokens issued"
        );
        Ok(pair)
    }

    /// Exchange a refresh token for a new access token
    pub fn refresh(&self, refresh_token: &str) -> DomainResult<String> {
        self.tokens.refresh(refresh_token)
    }

    /// Load the user behind an authenticated subject
    pub async fn current_user(&self, subject: &str) -> DomainResult<User> {
        let not_found = || DomainError::NotFound {
            resource: "user".to_string(),
        };
        let id = Uuid::parse_str(subject).map_err(|_| not_found())?;
        self.users.find_by_id(id).await?.ok_or_else(not_found)
    }
}
