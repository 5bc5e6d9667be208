//! Application state and factory
//!
//! This module wires the admission components together and provides the
//! factory for creating the Actix-web application.

use std::net::IpAddr;
use std::sync::Arc;

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use ts_core::clock::Clock;
use ts_core::domain::value_objects::{ExpectedValue, HeaderRule};
use ts_core::errors::DomainResult;
use ts_core::repositories::UserRepository;
use ts_core::services::admission::{AdmissionChain, RoutePolicy};
use ts_core::services::auth::AuthService;
use ts_core::services::rate_limit::{RateLimiter, ThrottleStore};
use ts_core::services::token::{TokenService, TokenServiceConfig};
use ts_core::services::two_factor::{ChallengeStore, CodeGenerator, EmailChannel, TwoFactorChallenge};
use ts_shared::{error_codes, AppConfig, CookieConfig, ErrorResponse};

use crate::handlers::json_error_handler;
use crate::middleware::Admission;

/// Largest accepted JSON body, bytes
const JSON_BODY_LIMIT: usize = 16 * 1024;
use crate::routes::{auth, users};

/// Shared state backing the two mutable admission components
pub struct Stores {
    pub throttle: Arc<dyn ThrottleStore>,
    pub challenges: Arc<dyn ChallengeStore>,
}

/// Application state shared by every worker
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub admission: Arc<AdmissionChain>,
    pub cookies: CookieConfig,
    /// Lifetime of the access-token cookie, seconds
    pub access_token_ttl: i64,
    /// Lifetime of the refresh-token cookie, seconds
    pub refresh_token_ttl: i64,
    /// Lifetime of the pending two-factor cookie, seconds
    pub two_factor_ttl: i64,
    /// Peers allowed to report the client address via forwarding headers
    pub trusted_proxies: Vec<IpAddr>,
}

impl AppState {
    /// Build every service from configuration and the injected collaborators.
    ///
    /// Fails on invalid configuration, which callers treat as fatal.
    pub fn build(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        stores: Stores,
        email: Arc<dyn EmailChannel>,
        codes: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> DomainResult<Self> {
        let tokens = Arc::new(TokenService::new(
            TokenServiceConfig::from(&config.auth.jwt)
                .with_two_factor_pending_ttl(config.two_factor.code_ttl_seconds),
            clock.clone(),
        )?);
        let limiter = Arc::new(RateLimiter::new(
            stores.throttle,
            clock.clone(),
            config.rate_limit.clone(),
        )?);
        let two_factor = Arc::new(TwoFactorChallenge::new(
            stores.challenges,
            email,
            codes,
            clock,
            config.two_factor.clone(),
        )?);

        let auth_service = Arc::new(AuthService::new(users, two_factor, tokens.clone()));
        let admission = Arc::new(AdmissionChain::standard(
            tokens,
            limiter,
            config.auth.cookies.access_cookie.clone(),
        ));

        Ok(Self {
            auth_service,
            admission,
            cookies: config.auth.cookies.clone(),
            access_token_ttl: config.auth.jwt.access_token_expiry,
            refresh_token_ttl: config.auth.jwt.refresh_token_expiry,
            two_factor_ttl: config.two_factor.code_ttl_seconds,
            trusted_proxies: config.server.trusted_proxies.clone(),
        })
    }
}

/// Route policies, one per route class
pub mod policies {
    use super::*;

    /// `POST /login` only accepts JSON bodies
    pub fn login() -> RoutePolicy {
        RoutePolicy::public("auth_login").require_header(
            HeaderRule::new("Content-Type")
                .expect(ExpectedValue::one_of([
                    "application/json",
                    "application/json; charset=utf-8",
                ]))
                .invalid_message("Content-Type must be application/json"),
        )
    }

    pub fn two_factor() -> RoutePolicy {
        RoutePolicy::public("auth_two_factor")
    }

    pub fn refresh() -> RoutePolicy {
        RoutePolicy::public("auth_refresh")
    }

    pub fn logout() -> RoutePolicy {
        RoutePolicy::authenticated("auth_logout")
    }

    pub fn users() -> RoutePolicy {
        RoutePolicy::authenticated("users")
    }

    pub fn health() -> RoutePolicy {
        RoutePolicy::public("health")
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .app_data(
            web::JsonConfig::default()
                .limit(JSON_BODY_LIMIT)
                .error_handler(json_error_handler),
        )
        .wrap(TracingLogger::default())
        .service(
            web::resource("/health")
                .wrap(Admission::new(policies::health()))
                .route(web::get().to(health_check)),
        )
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .service(
                            web::resource("/login")
                                .wrap(Admission::new(policies::login()))
                                .route(web::post().to(auth::login::login)),
                        )
                        .service(
                            web::resource("/login/2fa")
                                .wrap(Admission::new(policies::two_factor()))
                                .route(web::post().to(auth::two_factor::verify_two_factor)),
                        )
                        .service(
                            web::resource("/refresh")
                                .wrap(Admission::new(policies::refresh()))
                                .route(web::post().to(auth::refresh::refresh)),
                        )
                        .service(
                            web::resource("/logout")
                                .wrap(Admission::new(policies::logout()))
                                .route(web::post().to(auth::logout::logout)),
                        ),
                )
                .service(
                    web::scope("/users")
                        .wrap(Admission::new(policies::users()))
                        .route("/me", web::get().to(users::me)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "turnstile",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
