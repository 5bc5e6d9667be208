//! Ordered admission gates run before any business handler
//!
//! A request passes header rules, then access-token authentication, then
//! the rate limiter. The first rejection short-circuits the chain.

mod chain;
mod context;
mod gates;


pub use chain::AdmissionChain;
pub use context::{RequestContext, RoutePolicy};
pub use gates::{AdmissionGate, HeaderGate, ThrottleGate, TokenGate};
