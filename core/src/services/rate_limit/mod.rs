//! Fixed-window request throttling
//!
//! The counting algorithm lives in [`RateLimiter`]; counters live behind
//! [`ThrottleStore`], whose `hit` must be atomic per key.

mod limiter;
mod traits;


pub use limiter::{RateLimitDecision, RateLimiter};
pub use traits::ThrottleStore;
