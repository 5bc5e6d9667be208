pub mod admission;
pub mod auth;

pub use admission::Admission;
pub use auth::{AuthContext, OptionalAuth};
