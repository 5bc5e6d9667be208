//! # Turnstile Core
//!
//! Request admission for the Turnstile server: header rules, cookie-carried
//! session tokens, an emailed second factor and fixed-window throttling,
//! composed into an ordered admission chain.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::entities::{
    ChallengeState, Claims, Identity, ThrottleWindow, TokenKind, TokenPair, TwoFactorRecord, User,
};
pub use domain::value_objects::{ExpectedValue, HeaderParam, HeaderRule};
pub use errors::{
    AuthError, DomainError, DomainResult, HeaderError, RateLimitError, TokenError, TwoFactorError,
};
pub use repositories::{InMemoryUserRepository, UserRepository};
pub use services::{
    AdmissionChain, AdmissionGate, AuthService, ChallengeIssued, ChallengeStore, CodeGenerator,
    EmailChannel, HeaderMatcher, HeaderSource, LoginChallenge, RandomCodeGenerator,
    RateLimitDecision, RateLimiter, RequestContext, RoutePolicy, ThrottleStore, TokenService,
    TokenServiceConfig, TwoFactorChallenge,
};
