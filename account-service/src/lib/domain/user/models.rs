use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// A persisted account. `password_hash` is always an Argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
///
/// Issued by storage and never zero once a user has been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// Parse a user ID from a path segment.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not an unsigned decimal integer
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        s.parse::<u64>()
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw user payload as submitted by a client.
///
/// Missing JSON fields deserialize to empty strings so that they are
/// reported by validation as required fields. `password` holds plaintext
/// until a successful register validation replaces it with its hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserDraft {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl UserDraft {
    pub fn new(
        username: impl Into<String>,
        nickname: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            nickname: nickname.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Validated data for a user about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Validated set of mutable fields for an existing user.
///
/// Password hash and creation timestamp cannot be changed through an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub username: String,
    pub nickname: String,
    pub email: String,
}

impl User {
    /// Apply changes to the mutable fields, keeping identity, hash and timestamp.
    pub fn apply(mut self, changes: UserChanges) -> Self {
        self.username = changes.username;
        self.nickname = changes.nickname;
        self.email = changes.email;
        self
    }
}
