//! User entity as seen by the login flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user that can log in. Only the fields admission needs are modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,

    /// Login identifier and two-factor delivery address
    pub email: String,

    pub display_name: String,

    /// bcrypt hash; never serialized outward
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: display_name.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// Subject string carried in token claims and challenge records
    pub fn subject(&self) -> String {
        self.id.to_string()
    }
}
