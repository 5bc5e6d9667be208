use actix_web::{web, HttpRequest, HttpResponse};

use ts_core::errors::{DomainError, TokenError};

use crate::app::AppState;
use crate::dto::auth::RefreshResponse;
use crate::handlers::error::handle_domain_error;

use super::credential_cookie;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges the refresh-token cookie for a new access-token cookie. The
/// refresh token itself is left in place until it expires.
pub async fn refresh(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let cookies = &state.cookies;
    let refresh_token = match req.cookie(&cookies.refresh_cookie) {
        Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
        _ => return handle_domain_error(&DomainError::from(TokenError::Missing)),
    };

    match state.auth_service.refresh(&refresh_token) {
        Ok(access_token) => HttpResponse::Ok()
            .cookie(credential_cookie(
                &cookies.access_cookie,
                access_token,
                state.access_token_ttl,
                cookies.secure,
            ))
            .json(RefreshResponse {
                message: "Access token refreshed".to_string(),
                expires_in: state.access_token_ttl,
            }),
        Err(error) => handle_domain_error(&error),
    }
}
