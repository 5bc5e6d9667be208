//! Individual admission gates

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::token::{Identity, TokenKind};
use crate::errors::{DomainResult, RateLimitError, TokenError};
use crate::services::header::HeaderMatcher;
use crate::services::rate_limit::{RateLimitDecision, RateLimiter};
use crate::services::token::TokenService;

use super::context::RequestContext;

/// One step of the admission chain. Takes the context by value and hands it
/// back, possibly enriched, or rejects the request.
#[async_trait]
pub trait AdmissionGate: Send + Sync {
    fn name(&self) -> &'static str;

    async fn admit(&self, ctx: RequestContext) -> DomainResult<RequestContext>;
}

/// Applies the route's header rules
#[derive(Debug, Default)]
pub struct HeaderGate;

#[async_trait]
impl AdmissionGate for HeaderGate {
    fn name(&self) -> &'static str {
        "headers"
    }

    async fn admit(&self, mut ctx: RequestContext) -> DomainResult<RequestContext> {
        let policy = ctx.policy.clone();
        for param in &policy.header_rules {
            let extracted = HeaderMatcher::extract(&ctx.headers, param)?;
            ctx.extracted_headers.push(extracted);
        }
        Ok(ctx)
    }
}

/// Authenticates the access-token cookie on non-public routes
pub struct TokenGate {
    tokens: Arc<TokenService>,
    cookie_name: String,
}

impl TokenGate {
    pub fn new(tokens: Arc<TokenService>, cookie_name: impl Into<String>) -> Self {
        Self {
            tokens,
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl AdmissionGate for TokenGate {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn admit(&self, mut ctx: RequestContext) -> DomainResult<RequestContext> {
        if ctx.policy.public {
            return Ok(ctx);
        }

        let token = ctx
            .cookies
            .get(&self.cookie_name)
            .filter(|value| !value.is_empty())
            .ok_or(TokenError::Missing)?;

        let claims = self.tokens.validate(token, TokenKind::Access)?;
        ctx.identity = Some(Identity::from(claims));
        Ok(ctx)
    }
}

/// Counts the request against its throttle key
pub struct ThrottleGate {
    limiter: Arc<RateLimiter>,
}

impl ThrottleGate {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

#[async_trait]
impl AdmissionGate for ThrottleGate {
    fn name(&self) -> &'static str {
        "throttle"
    }

    async fn admit(&self, mut ctx: RequestContext) -> DomainResult<RequestContext> {
        let decision = self.limiter.allow(&ctx.throttle_key()).await?;
        match decision {
            RateLimitDecision::Denied {
                retry_after_seconds,
                limit,
            } => Err(RateLimitError::Exceeded {
                retry_after_seconds,
                limit,
            }
            .into()),
            RateLimitDecision::Allowed { .. } => {
                ctx.rate_limit = Some(decision);
                Ok(ctx)
            }
        }
    }
}
