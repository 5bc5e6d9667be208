//! Domain entities representing core business objects.

pub mod throttle;
pub mod token;
pub mod two_factor;
pub mod user;

// Re-export commonly used types
pub use throttle::{ThrottleWindow, WindowPosition};
pub use token::{Claims, Identity, TokenKind, TokenPair};
pub use two_factor::{ChallengeState, RecordUpdate, Submission, TwoFactorRecord};
pub use user::User;
