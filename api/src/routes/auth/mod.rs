//! Authentication route handlers
//!
//! This module contains the password + emailed-code login flow:
//! - Login (password check, starts the two-factor challenge)
//! - Two-factor code submission (issues session cookies)
//! - Token refresh
//! - Logout

pub mod login;
pub mod logout;
pub mod refresh;
pub mod two_factor;

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::HttpResponse;
use validator::ValidationErrors;

use ts_shared::{error_codes, ErrorResponse};

/// HttpOnly cookie scoped to the whole site
pub(crate) fn credential_cookie(
    name: &str,
    value: impl Into<String>,
    max_age_seconds: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build(name.to_string(), value.into())
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(max_age_seconds))
        .finish()
}

/// Cookie instructing the browser to drop `name`
pub(crate) fn removal_cookie(name: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = credential_cookie(name, "", 0, secure);
    cookie.make_removal();
    cookie
}

pub(crate) fn validation_error(errors: ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(
        ErrorResponse::new(error_codes::BAD_REQUEST, "Invalid request data")
            .add_detail("validation_errors", errors),
    )
}
