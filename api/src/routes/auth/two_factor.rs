use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use ts_core::errors::{DomainError, TwoFactorError};

use crate::app::AppState;
use crate::dto::auth::{SessionResponse, TwoFactorRequest};
use crate::handlers::error::handle_domain_error;

use super::{credential_cookie, removal_cookie, validation_error};

/// Handler for POST /api/v1/auth/login/2fa
///
/// Submits the emailed code for the challenge the signed pending-login
/// cookie is bound to. On success the access and refresh tokens are set as
/// HttpOnly cookies and the pending cookie is cleared.
///
/// ## Errors
/// - 401 Unauthorized: Missing, forged or superseded pending cookie, expired
///   challenge or wrong code
///   (`details.attempts_remaining` tells how many tries are left)
/// - 403 Forbidden: Attempts exhausted; the login must be restarted
pub async fn verify_two_factor(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<TwoFactorRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error(errors);
    }

    let cookies = &state.cookies;
    let pending_token = match req.cookie(&cookies.pending_two_factor_cookie) {
        Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
        _ => return handle_domain_error(&DomainError::from(TwoFactorError::NoActiveChallenge)),
    };

    match state.auth_service.complete_two_factor(&pending_token, &request.code).await {
        Ok(pair) => HttpResponse::Ok()
            .cookie(credential_cookie(
                &cookies.access_cookie,
                pair.access_token,
                pair.access_expires_in,
                cookies.secure,
            ))
            .cookie(credential_cookie(
                &cookies.refresh_cookie,
                pair.refresh_token,
                pair.refresh_expires_in,
                cookies.secure,
            ))
            .cookie(removal_cookie(&cookies.pending_two_factor_cookie, cookies.secure))
            .json(SessionResponse {
                message: "Login successful".to_string(),
                access_expires_in: pair.access_expires_in,
                refresh_expires_in: pair.refresh_expires_in,
            }),
        Err(error) => handle_domain_error(&error),
    }
}
