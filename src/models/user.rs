use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Account fields supplied on registration
///
/// `password_hash` is already hashed by the caller; this crate never sees plaintext.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    // Absent keys arrive empty so registration can reject them as missing fields
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password_hash: String,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
