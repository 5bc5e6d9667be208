//! Cache module for Redis-backed state
//!
//! Throttle counters and two-factor challenges live here when several
//! server instances must share them. Every multi-step update runs as a
//! single Lua script so it is atomic on the Redis side.

pub mod redis_challenge_store;
pub mod redis_client;
pub mod redis_throttle_store;

pub use redis_challenge_store::RedisChallengeStore;
pub use redis_client::RedisClient;
pub use redis_throttle_store::RedisThrottleStore;

// Re-export commonly used types
pub use ts_shared::CacheConfig;
