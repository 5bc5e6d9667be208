use super::*;
use crate::domain::entities::token::TokenKind;

#[test]
fn test_domain_error_bridges() {
    let err: DomainError = TokenError::Expired.into();
    assert_eq!(err, DomainError::Token(TokenError::Expired));
    assert_eq!(err.to_string(), "Token expired");

    let err: DomainError = TwoFactorError::InvalidCode { attempts_remaining: 2 }.into();
    assert!(err.to_string().contains("2 attempt(s) remaining"));
}

#[test]
fn test_header_error_surfaces_configured_message() {
    let err = HeaderError::MissingHeader {
        message: "Authorization header is required".to_string(),
    };
    assert_eq!(err.to_string(), "Authorization header is required");
}

#[test]
fn test_wrong_kind_names_both_kinds() {
    let err = TokenError::WrongKind {
        expected: TokenKind::Access,
        actual: TokenKind::Refresh,
    };
    assert_eq!(err.to_string(), "Token kind mismatch: expected access, got refresh");
}
