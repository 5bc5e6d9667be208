//! Main token service implementation

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::token::{Claims, PendingLogin, TokenKind, TokenPair};
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;

/// Issues and validates signed, time-bounded session tokens.
///
/// Expiry is judged against the injected [`Clock`], never the library's own
/// notion of now, so the decoder is configured not to check `exp` itself.
pub struct TokenService {
    config: TokenServiceConfig,
    clock: Arc<dyn Clock>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `config` - Token service configuration
    /// * `clock` - Time source for `iat`/`exp` and expiry checks
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or a configuration error when the secret is
    /// missing or the lifetimes are inconsistent
    pub fn new(config: TokenServiceConfig, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            config,
            clock,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Sign a token of `kind` for `subject`, valid from now for the kind's TTL
    pub fn issue(&self, subject: &str, kind: TokenKind) -> Result<String, DomainError> {
        self.sign(subject, kind, None)
    }

    /// Sign the token that lets the holder answer `challenge_id`, and only that challenge
    pub fn issue_two_factor_pending(
        &self,
        subject: &str,
        challenge_id: Uuid,
    ) -> Result<String, DomainError> {
        self.sign(subject, TokenKind::TwoFactorPending, Some(challenge_id))
    }

    /// Validate a pending-login token and recover the challenge it is bound to.
    /// A pending token without a readable challenge id counts as forged.
    pub fn validate_two_factor_pending(&self, token: &str) -> Result<PendingLogin, TokenError> {
        let claims = self.validate(token, TokenKind::TwoFactorPending)?;
        let challenge_id = claims
            .cid
            .as_deref()
            .and_then(|cid| Uuid::parse_str(cid).ok())
            .ok_or(TokenError::InvalidSignature)?;
        Ok(PendingLogin {
            subject: claims.sub,
            challenge_id,
        })
    }

    fn sign(
        &self,
        subject: &str,
        kind: TokenKind,
        challenge_id: Option<Uuid>,
    ) -> Result<String, DomainError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.config.ttl(kind)).timestamp(),
            kind,
            jti: Uuid::new_v4().to_string(),
            cid: challenge_id.map(|id| id.to_string()),
        };
        self.encode_jwt(&claims)
    }

    /// Issue the access/refresh pair handed out when a login completes
    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, DomainError> {
        Ok(TokenPair {
            access_token: self.issue(subject, TokenKind::Access)?,
            refresh_token: self.issue(subject, TokenKind::Refresh)?,
            access_expires_in: self.config.access_token_ttl_seconds,
            refresh_expires_in: self.config.refresh_token_ttl_seconds,
        })
    }

    /// Verify signature, then expiry, then kind.
    ///
    /// Any token that cannot be decoded with this service's key reports
    /// `InvalidSignature`; the caller learns nothing more specific.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                if *e.kind() != ErrorKind::InvalidSignature {
                    tracing::debug!(error = %e, "Rejected malformed token");
                }
                TokenError::InvalidSignature
            })?;
        let claims = token_data.claims;

        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }

        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: claims.kind,
            });
        }

        Ok(claims)
    }

    /// Exchange a valid refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated; it stays usable until it expires.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, DomainError> {
        let claims = self.validate(refresh_token, TokenKind::Refresh)?;
        tracing::info!(
            subject = %claims.sub,
            refresh_jti = %claims.jti,
            event = "access_token_refreshed",
            "Issued access token from refresh token"
        );
        self.issue(&claims.sub, TokenKind::Access)
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub(crate) fn encode_jwt(&self, claims: &Claims) -> Result<String, DomainError> {
        encode(&Header::new(self.config.algorithm), claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to encode token");
            DomainError::Token(TokenError::GenerationFailed)
        })
    }
}
