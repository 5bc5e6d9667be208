//! In-memory user directory, seeded at startup

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

use super::r#trait::UserRepository;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory holding `users`
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub fn insert(&self, user: User) -> Result<(), DomainError> {
        self.users
            .write()
            .map_err(|_| DomainError::internal("user directory lock poisoned"))?
            .insert(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self
            .users
            .read()
            .map_err(|_| DomainError::internal("user directory lock poisoned"))?;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let users = self
            .users
            .read()
            .map_err(|_| DomainError::internal("user directory lock poisoned"))?;
        Ok(users.get(&id).cloned())
    }
}
