//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::web;

use ts_api::{AppState, Stores};
use ts_core::clock::{Clock, ManualClock};
use ts_core::domain::entities::user::User;
use ts_core::repositories::InMemoryUserRepository;
use ts_core::services::two_factor::CodeGenerator;
use ts_infra::email::LogEmailChannel;
use ts_infra::memory::{MemoryChallengeStore, MemoryThrottleStore};
use ts_shared::{
    AppConfig, AuthConfig, CookieConfig, Environment, JwtConfig, LoggingConfig, RateLimitConfig,
    ServerConfig, TwoFactorConfig,
};

pub const EMAIL: &str = "alice@example.com";
pub const PASSWORD: &str = "correct horse battery staple";
pub const CODE: &str = "424242";
pub const WRONG_CODE: &str = "000000";

/// Always hands out [`CODE`]
pub struct FixedCode;

impl CodeGenerator for FixedCode {
    fn generate(&self, _length: usize) -> String {
        CODE.to_string()
    }
}

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub clock: Arc<ManualClock>,
    pub email: LogEmailChannel,
    pub user: User,
}

pub fn test_config(max_requests: u32) -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        server: ServerConfig::default(),
        auth: AuthConfig {
            jwt: JwtConfig::new("integration-test-secret"),
            cookies: CookieConfig::default(),
        },
        cache: None,
        rate_limit: RateLimitConfig::new(max_requests, 60),
        two_factor: TwoFactorConfig::default(),
        logging: LoggingConfig::default(),
    }
}

pub fn test_app() -> TestApp {
    test_app_with_limit(1_000)
}

pub fn test_app_with_limit(max_requests: u32) -> TestApp {
    test_app_with_config(test_config(max_requests))
}

pub fn test_app_with_config(config: AppConfig) -> TestApp {
    let clock = Arc::new(ManualClock::starting_now());
    let email = LogEmailChannel::new();

    let hash = bcrypt::hash(PASSWORD, 4).expect("hash test password");
    let user = User::new(EMAIL, "Alice", hash);
    let users = Arc::new(InMemoryUserRepository::with_users([user.clone()]));

    let stores = Stores {
        throttle: Arc::new(MemoryThrottleStore::new()),
        challenges: Arc::new(MemoryChallengeStore::new()),
    };

    let state = AppState::build(
        &config,
        users,
        stores,
        Arc::new(email.clone()),
        Arc::new(FixedCode),
        clock.clone() as Arc<dyn Clock>,
    )
    .expect("build app state");

    TestApp {
        state: web::Data::new(state),
        clock,
        email,
        user,
    }
}

pub fn cookie_value<B>(resp: &ServiceResponse<B>, name: &str) -> Option<String> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}
