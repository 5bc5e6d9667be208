//! Domain error to HTTP response mapping
//!
//! Header rejections are 406, token and two-factor rejections 401 (403 once
//! a challenge is locked), quota denials 429 with `Retry-After`. Internal
//! failures are logged and surfaced as a generic 500.

use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::{header, StatusCode},
    HttpRequest, HttpResponse,
};

use ts_core::errors::{
    AuthError, DomainError, HeaderError, RateLimitError, TokenError, TwoFactorError,
};
use ts_shared::{error_codes, ErrorResponse};

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::Header(header_error) => {
            let code = match header_error {
                HeaderError::MissingHeader { .. } => error_codes::MISSING_HEADER,
                HeaderError::InvalidHeaderValue { .. } => error_codes::INVALID_HEADER_VALUE,
            };
            tracing::debug!(error = %header_error, "Header rule rejected request");
            respond(
                StatusCode::NOT_ACCEPTABLE,
                ErrorResponse::new(code, header_error.to_string()),
            )
        }

        DomainError::Token(token_error) => match token_error {
            TokenError::Missing => unauthorized(error_codes::TOKEN_MISSING, "Authentication required"),
            TokenError::Expired => unauthorized(error_codes::TOKEN_EXPIRED, "Token expired"),
            TokenError::InvalidSignature => unauthorized(error_codes::TOKEN_INVALID, "Invalid token"),
            TokenError::WrongKind { .. } => {
                unauthorized(error_codes::TOKEN_WRONG_KIND, "Wrong token type for this request")
            }
            TokenError::GenerationFailed => internal(error),
        },

        DomainError::Auth(auth_error) => match auth_error {
            AuthError::InvalidCredentials => {
                unauthorized(error_codes::INVALID_CREDENTIALS, "Invalid email or password")
            }
            AuthError::Unauthenticated => {
                unauthorized(error_codes::UNAUTHORIZED, "Authentication required")
            }
        },

        DomainError::TwoFactor(two_factor_error) => match two_factor_error {
            TwoFactorError::NoActiveChallenge => unauthorized(
                error_codes::NO_ACTIVE_CHALLENGE,
                "No active verification. Please log in again",
            ),
            TwoFactorError::ChallengeExpired => unauthorized(
                error_codes::CHALLENGE_EXPIRED,
                "Verification code expired. Please log in again",
            ),
            TwoFactorError::InvalidCode { attempts_remaining } => respond(
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(error_codes::INVALID_CODE, "Invalid verification code")
                    .add_detail("attempts_remaining", attempts_remaining),
            ),
            TwoFactorError::AttemptsExceeded => respond(
                StatusCode::FORBIDDEN,
                ErrorResponse::new(
                    error_codes::ATTEMPTS_EXCEEDED,
                    "Too many failed attempts. Please log in again",
                ),
            ),
        },

        DomainError::RateLimit(RateLimitError::Exceeded {
            retry_after_seconds,
            limit,
        }) => HttpResponse::TooManyRequests()
            .insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()))
            .json(
                ErrorResponse::new(
                    error_codes::RATE_LIMIT_EXCEEDED,
                    format!("Too many requests. Retry after {} seconds", retry_after_seconds),
                )
                .add_detail("retry_after_seconds", retry_after_seconds)
                .add_detail("limit", limit),
            ),

        DomainError::Validation { message } => respond(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(error_codes::BAD_REQUEST, message.clone()),
        ),

        DomainError::NotFound { resource } => respond(
            StatusCode::NOT_FOUND,
            ErrorResponse::new(error_codes::NOT_FOUND, format!("{} not found", resource)),
        ),

        DomainError::Internal { .. } | DomainError::Config(_) => internal(error),
    }
}

/// Extractor failures for JSON bodies, in the same envelope as domain errors
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %error, "Rejected request body");
    let response = respond(
        StatusCode::BAD_REQUEST,
        ErrorResponse::new(error_codes::BAD_REQUEST, "Invalid JSON body")
            .add_detail("reason", error.to_string()),
    );
    InternalError::from_response(error, response).into()
}

fn respond(status: StatusCode, body: ErrorResponse) -> HttpResponse {
    HttpResponse::build(status).json(body)
}

fn unauthorized(code: &str, message: &str) -> HttpResponse {
    respond(StatusCode::UNAUTHORIZED, ErrorResponse::new(code, message))
}

fn internal(error: &DomainError) -> HttpResponse {
    tracing::error!(error = %error, "Request failed with internal error");
    respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                DomainError::Header(HeaderError::MissingHeader {
                    message: "Missing required header: X".to_string(),
                }),
                StatusCode::NOT_ACCEPTABLE,
            ),
            (DomainError::Token(TokenError::Expired), StatusCode::UNAUTHORIZED),
            (DomainError::Auth(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (
                DomainError::TwoFactor(TwoFactorError::InvalidCode { attempts_remaining: 1 }),
                StatusCode::UNAUTHORIZED,
            ),
            (
                DomainError::TwoFactor(TwoFactorError::AttemptsExceeded),
                StatusCode::FORBIDDEN,
            ),
            (DomainError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(handle_domain_error(&error).status(), status, "{:?}", error);
        }
    }

    #[test]
    fn test_rate_limit_sets_retry_after() {
        let response = handle_domain_error(&DomainError::RateLimit(RateLimitError::Exceeded {
            retry_after_seconds: 42,
            limit: 5,
        }));

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "42"
        );
    }

    #[test]
    fn test_json_error_uses_error_envelope() {
        let req = actix_web::test::TestRequest::default().to_http_request();
        let error = json_error_handler(JsonPayloadError::ContentType, &req);

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
