use actix_web::{web, HttpResponse};
use validator::Validate;

use ts_core::services::auth::LoginChallenge;

use crate::app::AppState;
use crate::dto::auth::{LoginRequest, LoginResponse};
use crate::handlers::error::handle_domain_error;

use super::{credential_cookie, validation_error};

/// Handler for POST /api/v1/auth/login
///
/// Checks email and password, then emails a two-factor code. A signed token
/// bound to the new challenge is set as a short-lived HttpOnly cookie for the
/// follow-up `POST /api/v1/auth/login/2fa`.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "alice@example.com",
///     "password": "s3cret!"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Invalid request data
/// - 401 Unauthorized: Unknown email or wrong password (indistinguishable)
/// - 406 Not Acceptable: Content-Type is not application/json
/// - 429 Too Many Requests: Login quota exhausted
pub async fn login(state: web::Data<AppState>, request: web::Json<LoginRequest>) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error(errors);
    }

    match state.auth_service.login(&request.email, &request.password).await {
        Ok(LoginChallenge {
            challenge,
            pending_token,
            ..
        }) => HttpResponse::Ok()
            .cookie(credential_cookie(
                &state.cookies.pending_two_factor_cookie,
                pending_token,
                state.two_factor_ttl,
                state.cookies.secure,
            ))
            .json(LoginResponse {
                message: "Verification code sent".to_string(),
                challenge_id: challenge.challenge_id,
                expires_at: challenge.expires_at,
                attempts_remaining: challenge.attempts_remaining,
                delivered: challenge.delivered,
            }),
        Err(error) => handle_domain_error(&error),
    }
}
