//! Request extractors for the identity the admission middleware attaches.

use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, ResponseError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::{ready, Ready};

use ts_core::domain::entities::token::Identity;
use ts_core::errors::{AuthError, DomainError};

use crate::handlers::error::handle_domain_error;

/// Authenticated caller, injected into request extensions after admission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Subject of the access token
    pub subject: String,
    /// Access token id (`jti`)
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Identity> for AuthContext {
    fn from(identity: Identity) -> Self {
        Self {
            subject: identity.subject,
            token_id: identity.token_id,
            expires_at: identity.expires_at,
        }
    }
}

/// Rejection for handlers reached without an authenticated identity
#[derive(Debug)]
pub struct Unauthenticated;

impl fmt::Display for Unauthenticated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", AuthError::Unauthenticated)
    }
}

impl ResponseError for Unauthenticated {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        handle_domain_error(&DomainError::Auth(AuthError::Unauthenticated))
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| Unauthenticated.into());

        ready(result)
    }
}

/// Extractor for optional authentication
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequest for OptionalAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let auth = req.extensions().get::<AuthContext>().cloned();
        ready(Ok(OptionalAuth(auth)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};

    fn context() -> AuthContext {
        AuthContext {
            subject: "user-1".to_string(),
            token_id: "jti-1".to_string(),
            expires_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn test_extracts_injected_context() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(context());

        let extracted = AuthContext::extract(&req).await.unwrap();
        assert_eq!(extracted.subject, "user-1");
    }

    #[actix_web::test]
    async fn test_missing_context_is_unauthorized() {
        let req = test::TestRequest::default().to_http_request();

        let err = AuthContext::extract(&req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

        let optional = OptionalAuth::extract(&req).await.unwrap();
        assert!(optional.0.is_none());
    }
}
