use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::auth::LogoutResponse;
use crate::middleware::auth::AuthContext;

use super::removal_cookie;

/// Handler for POST /api/v1/auth/logout
///
/// Clears the credential cookies. Requires a valid access-token cookie.
pub async fn logout(state: web::Data<AppState>, auth: AuthContext) -> HttpResponse {
    let cookies = &state.cookies;

    tracing::info!(
        subject = %auth.subject,
        token_id = %auth.token_id,
        event = "logout",
        "Session cookies cleared"
    );

    HttpResponse::Ok()
        .cookie(removal_cookie(&cookies.access_cookie, cookies.secure))
        .cookie(removal_cookie(&cookies.refresh_cookie, cookies.secure))
        .json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        })
}
