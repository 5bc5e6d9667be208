//! Unit tests for the login flow

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use ts_shared::TwoFactorConfig;

use crate::clock::ManualClock;
use crate::domain::entities::token::TokenKind;
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, TwoFactorError};
use crate::repositories::InMemoryUserRepository;
use crate::services::auth::{AuthService, BcryptVerifier, PasswordVerifier};
use crate::services::token::{TokenService, TokenServiceConfig};
use crate::services::two_factor::tests::mocks::{
    FixedCodeGenerator, MockChallengeStore, MockEmailChannel,
};
use crate::services::two_factor::TwoFactorChallenge;

const CODE: &str = "246810";
const PASSWORD: &str = "correct horse battery staple";

struct Fixture {
    auth: AuthService,
    tokens: Arc<TokenService>,
    two_factor: Arc<TwoFactorChallenge>,
    email: Arc<MockEmailChannel>,
    user: User,
}

/// bcrypt verifier that counts how often it was asked
#[derive(Default)]
struct CountingVerifier {
    calls: AtomicUsize,
}

impl PasswordVerifier for CountingVerifier {
    fn verify(&self, password: &str, hash: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        BcryptVerifier.verify(password, hash)
    }
}

fn fixture() -> Fixture {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 2, 2, 10, 0, 0).unwrap(),
    ));
    let user = User::new("alice@example.com", "Alice", bcrypt::hash(PASSWORD, 4).unwrap());
    let users = Arc::new(InMemoryUserRepository::with_users([user.clone()]));
    let email = Arc::new(MockEmailChannel::new());
    let two_factor = Arc::new(
        TwoFactorChallenge::new(
            Arc::new(MockChallengeStore::new()),
            email.clone(),
            Arc::new(FixedCodeGenerator(CODE)),
            clock.clone(),
            TwoFactorConfig::default(),
        )
        .unwrap(),
    );
    let tokens = Arc::new(
        TokenService::new(TokenServiceConfig::new("auth-flow-test-secret"), clock).unwrap(),
    );
    Fixture {
        auth: AuthService::new(users, two_factor.clone(), tokens.clone()),
        tokens,
        two_factor,
        email,
        user,
    }
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let f = fixture();

    let wrong_password = f.auth.login("alice@example.com", "nope").await.unwrap_err();
    let unknown = f.auth.login("mallory@example.com", PASSWORD).await.unwrap_err();

    assert_eq!(wrong_password, DomainError::Auth(AuthError::InvalidCredentials));
    assert_eq!(wrong_password, unknown);
    assert!(f.email.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_full_login_scenario() {
    let f = fixture();

    let login = f.auth.login(" Alice@Example.com ", PASSWORD).await.unwrap();
    assert_eq!(login.subject, f.user.subject());
    assert_eq!(login.challenge.attempts_remaining, 3);
    assert_eq!(f.email.last_code().as_deref(), Some(CODE));

    for expected_remaining in [2, 1] {
        let err = f.auth.complete_two_factor(&login.pending_token, "999999").await.unwrap_err();
        assert_eq!(
            err,
            DomainError::TwoFactor(TwoFactorError::InvalidCode {
                attempts_remaining: expected_remaining
            })
        );
    }

    let pair = f.auth.complete_two_factor(&login.pending_token, CODE).await.unwrap();
    let claims = f.tokens.validate(&pair.access_token, TokenKind::Access).unwrap();
    assert_eq!(claims.sub, f.user.subject());
    assert!(f.tokens.validate(&pair.refresh_token, TokenKind::Refresh).is_ok());

    let me = f.auth.current_user(&claims.sub).await.unwrap();
    assert_eq!(me.email, "alice@example.com");
}

#[tokio::test]
async fn test_refresh_through_service() {
    let f = fixture();
    let pair = f.tokens.issue_pair(&f.user.subject()).unwrap();

    let access = f.auth.refresh(&pair.refresh_token).unwrap();
    assert!(f.tokens.validate(&access, TokenKind::Access).is_ok());
    assert!(f.auth.refresh(&pair.access_token).is_err());
}

#[tokio::test]
async fn test_current_user_with_unknown_subject() {
    let f = fixture();
    assert!(matches!(
        f.auth.current_user("not-a-uuid").await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_unknown_email_still_checks_a_hash() {
    let f = fixture();
    let verifier = Arc::new(CountingVerifier::default());
    let auth = f.auth.with_password_verifier(verifier.clone());

    assert!(auth.login("mallory@example.com", PASSWORD).await.is_err());
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);

    assert!(auth.login("alice@example.com", "nope").await.is_err());
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_forged_pending_token_spends_no_attempts() {
    let f = fixture();
    let login = f.auth.login("alice@example.com", PASSWORD).await.unwrap();

    let forgeries = [
        login.subject.clone(),
        f.tokens.issue(&login.subject, TokenKind::Access).unwrap(),
        f.tokens
            .issue_two_factor_pending(&login.subject, uuid::Uuid::new_v4())
            .unwrap(),
    ];
    for forged in &forgeries {
        assert_eq!(
            f.auth.complete_two_factor(forged, "999999").await.unwrap_err(),
            DomainError::TwoFactor(TwoFactorError::NoActiveChallenge)
        );
    }

    assert_eq!(
        f.two_factor.attempts_remaining(&login.subject).await.unwrap(),
        Some(3)
    );
    assert!(f.auth.complete_two_factor(&login.pending_token, CODE).await.is_ok());
}

#[tokio::test]
async fn test_new_login_invalidates_previous_pending_token() {
    let f = fixture();
    let first = f.auth.login("alice@example.com", PASSWORD).await.unwrap();
    let second = f.auth.login("alice@example.com", PASSWORD).await.unwrap();

    assert_eq!(
        f.auth.complete_two_factor(&first.pending_token, CODE).await.unwrap_err(),
        DomainError::TwoFactor(TwoFactorError::NoActiveChallenge)
    );
    assert!(f.auth.complete_two_factor(&second.pending_token, CODE).await.is_ok());
}
