//! Business services containing domain logic and use cases.

pub mod admission;
pub mod auth;
pub mod header;
pub mod rate_limit;
pub mod token;
pub mod two_factor;

// Re-export commonly used types
pub use admission::{AdmissionChain, AdmissionGate, RequestContext, RoutePolicy};
pub use auth::{AuthService, LoginChallenge};
pub use header::{ExtractedHeader, HeaderMatcher, HeaderSource};
pub use rate_limit::{RateLimitDecision, RateLimiter, ThrottleStore};
pub use token::{TokenService, TokenServiceConfig};
pub use two_factor::{
    ChallengeIssued, ChallengeStore, CodeGenerator, EmailChannel, RandomCodeGenerator,
    TwoFactorChallenge,
};
