//! User repository trait used by the login flow.
//!
//! Account management lives elsewhere; admission only needs to look users up.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Read-only access to user records
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by login email, compared case-insensitively
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that email
    /// * `Err(DomainError)` - Storage error
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
}
