//! Value objects representing immutable domain concepts.

pub mod header_rule;

// Re-export commonly used types
pub use header_rule::{ExpectedValue, HeaderParam, HeaderRule};
