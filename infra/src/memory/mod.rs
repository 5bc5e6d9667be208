//! In-process stores for single-instance deployments and tests

pub mod challenge_store;
pub mod throttle_store;

pub use challenge_store::MemoryChallengeStore;
pub use throttle_store::MemoryThrottleStore;
