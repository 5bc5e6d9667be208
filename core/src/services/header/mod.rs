//! Header validation against declarative per-route rules
//!
//! [`HeaderMatcher`] is a pure predicate; header lookup goes through
//! [`HeaderSource`] so the transport layer decides how headers are stored.

mod matcher;
mod source;


pub use matcher::{ExtractedHeader, HeaderMatcher};
pub use source::HeaderSource;
