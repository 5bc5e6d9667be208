//! Unit tests for the two-factor challenge

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use ts_shared::TwoFactorConfig;

use super::mocks::{
    ContendedChallengeStore, FixedCodeGenerator, MockChallengeStore, MockEmailChannel,
};
use crate::clock::{Clock, ManualClock};
use crate::domain::entities::two_factor::ChallengeState;
use crate::errors::{DomainError, TwoFactorError};
use crate::services::two_factor::{CodeGenerator, RandomCodeGenerator, TwoFactorChallenge};

const CODE: &str = "482913";

struct Fixture {
    service: Arc<TwoFactorChallenge>,
    store: Arc<MockChallengeStore>,
    email: Arc<MockEmailChannel>,
    clock: Arc<ManualClock>,
}

fn fixture_with(email: MockEmailChannel) -> Fixture {
    let store = Arc::new(MockChallengeStore::new());
    let email = Arc::new(email);
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
    ));
    let service = TwoFactorChallenge::new(
        store.clone(),
        email.clone(),
        Arc::new(FixedCodeGenerator(CODE)),
        clock.clone(),
        TwoFactorConfig::default(),
    )
    .unwrap();
    Fixture {
        service: Arc::new(service),
        store,
        email,
        clock,
    }
}

fn fixture() -> Fixture {
    fixture_with(MockEmailChannel::new())
}

fn two_factor_err(result: Result<ChallengeState, DomainError>) -> TwoFactorError {
    match result {
        Err(DomainError::TwoFactor(e)) => e,
        other => panic!("expected two-factor error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_start_commits_pending_and_emails_code() {
    let f = fixture();

    let issued = f.service.start("user-1", "alice@example.com").await.unwrap();

    assert!(issued.delivered);
    assert_eq!(issued.attempts_remaining, 3);
    assert_eq!(issued.expires_at, f.clock.now() + Duration::minutes(10));

    let record = f.store.get("user-1").unwrap();
    assert_eq!(record.state, ChallengeState::Pending);
    assert_eq!(record.id, issued.challenge_id);

    let sent = f.email.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination, "alice@example.com");
    assert_eq!(sent[0].code, CODE);
    assert_eq!(sent[0].expires_at, issued.expires_at);
}

#[tokio::test]
async fn test_delivery_failure_keeps_challenge_pending() {
    let f = fixture_with(MockEmailChannel::failing());

    let issued = f.service.start("user-1", "alice@example.com").await.unwrap();

    assert!(!issued.delivered);
    assert_eq!(
        f.service.state("user-1").await.unwrap(),
        Some(ChallengeState::Pending)
    );
    assert_eq!(f.service.submit("user-1", CODE).await.unwrap(), ChallengeState::Verified);
}

#[tokio::test]
async fn test_submit_without_challenge() {
    let f = fixture();
    assert_eq!(
        two_factor_err(f.service.submit("nobody", CODE).await),
        TwoFactorError::NoActiveChallenge
    );
}

#[tokio::test]
async fn test_login_scenario_two_wrong_then_correct() {
    let f = fixture();
    f.service.start("user-1", "alice@example.com").await.unwrap();

    assert_eq!(
        two_factor_err(f.service.submit("user-1", "000000").await),
        TwoFactorError::InvalidCode { attempts_remaining: 2 }
    );
    assert_eq!(
        two_factor_err(f.service.submit("user-1", "111111").await),
        TwoFactorError::InvalidCode { attempts_remaining: 1 }
    );
    assert_eq!(
        f.service.state("user-1").await.unwrap(),
        Some(ChallengeState::Pending)
    );
    assert_eq!(f.service.attempts_remaining("user-1").await.unwrap(), Some(1));

    assert_eq!(
        f.service.submit("user-1", CODE).await.unwrap(),
        ChallengeState::Verified
    );

    // Single use
    assert_eq!(f.service.state("user-1").await.unwrap(), None);
    assert_eq!(
        two_factor_err(f.service.submit("user-1", CODE).await),
        TwoFactorError::NoActiveChallenge
    );
}

#[tokio::test]
async fn test_lockout_after_max_attempts() {
    let f = fixture();
    f.service.start("user-1", "alice@example.com").await.unwrap();

    for _ in 0..2 {
        assert!(matches!(
            two_factor_err(f.service.submit("user-1", "000000").await),
            TwoFactorError::InvalidCode { .. }
        ));
    }
    assert_eq!(
        two_factor_err(f.service.submit("user-1", "000000").await),
        TwoFactorError::AttemptsExceeded
    );
    assert_eq!(
        f.service.state("user-1").await.unwrap(),
        Some(ChallengeState::Locked)
    );

    // Correct code after lockout still fails
    assert!(f.service.submit("user-1", CODE).await.is_err());
    assert_eq!(
        f.service.state("user-1").await.unwrap(),
        Some(ChallengeState::Locked)
    );
}

#[tokio::test]
async fn test_correct_code_after_expiry() {
    let f = fixture();
    f.service.start("user-1", "alice@example.com").await.unwrap();

    f.clock.advance(Duration::minutes(10) + Duration::seconds(1));

    assert_eq!(
        two_factor_err(f.service.submit("user-1", CODE).await),
        TwoFactorError::ChallengeExpired
    );
    assert_eq!(f.store.get("user-1").unwrap().state, ChallengeState::Expired);
    assert!(f.service.submit("user-1", CODE).await.is_err());
}

#[tokio::test]
async fn test_new_start_replaces_locked_record() {
    let f = fixture();
    f.service.start("user-1", "alice@example.com").await.unwrap();
    for _ in 0..3 {
        let _ = f.service.submit("user-1", "000000").await;
    }
    assert_eq!(
        f.service.state("user-1").await.unwrap(),
        Some(ChallengeState::Locked)
    );

    let issued = f.service.start("user-1", "alice@example.com").await.unwrap();
    assert_eq!(issued.attempts_remaining, 3);
    assert_eq!(
        f.service.state("user-1").await.unwrap(),
        Some(ChallengeState::Pending)
    );
    assert_eq!(f.email.last_code().as_deref(), Some(CODE));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_wrong_codes_each_count_once() {
    let f = fixture();
    let config = TwoFactorConfig {
        max_attempts: 5,
        ..TwoFactorConfig::default()
    };
    let service = Arc::new(
        TwoFactorChallenge::new(
            f.store.clone(),
            f.email.clone(),
            Arc::new(FixedCodeGenerator(CODE)),
            f.clock.clone(),
            config,
        )
        .unwrap(),
    );
    service.start("user-1", "alice@example.com").await.unwrap();

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.submit("user-1", "000000").await })
        })
        .collect();

    let mut exceeded = 0;
    for handle in handles {
        if let Err(DomainError::TwoFactor(TwoFactorError::AttemptsExceeded)) = handle.await.unwrap() {
            exceeded += 1;
        }
    }

    assert_eq!(exceeded, 1);
    assert_eq!(f.store.get("user-1").unwrap().state, ChallengeState::Locked);
}

#[tokio::test]
async fn test_submission_bound_to_superseded_challenge() {
    let f = fixture();
    let first = f.service.start("user-1", "alice@example.com").await.unwrap();
    let second = f.service.start("user-1", "alice@example.com").await.unwrap();

    for code in ["000000", CODE] {
        assert_eq!(
            two_factor_err(
                f.service
                    .submit_for_challenge("user-1", first.challenge_id, code)
                    .await
            ),
            TwoFactorError::NoActiveChallenge
        );
    }
    assert_eq!(f.service.attempts_remaining("user-1").await.unwrap(), Some(3));

    assert_eq!(
        f.service
            .submit_for_challenge("user-1", second.challenge_id, CODE)
            .await
            .unwrap(),
        ChallengeState::Verified
    );
}

#[tokio::test]
async fn test_many_attempts_survive_long_contention() {
    let store = Arc::new(ContendedChallengeStore::new(10));
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
    ));
    let config = TwoFactorConfig {
        max_attempts: 12,
        ..TwoFactorConfig::default()
    };
    let service = TwoFactorChallenge::new(
        store.clone(),
        Arc::new(MockEmailChannel::new()),
        Arc::new(FixedCodeGenerator(CODE)),
        clock,
        config,
    )
    .unwrap();
    service.start("user-1", "alice@example.com").await.unwrap();

    assert_eq!(
        two_factor_err(service.submit("user-1", "000000").await),
        TwoFactorError::InvalidCode { attempts_remaining: 11 }
    );
    assert_eq!(store.inner.get("user-1").unwrap().attempts_remaining, 11);
}

#[test]
fn test_random_codes_are_numeric_with_requested_length() {
    let generator = RandomCodeGenerator;
    for length in [4, 6, 10] {
        let code = generator.generate(length);
        assert_eq!(code.len(), length);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
