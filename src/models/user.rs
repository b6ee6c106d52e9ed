//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. Any authenticated user may add news.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique, case-sensitive)
    pub username: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user that has not been persisted yet.
    ///
    /// The password must already be hashed with `services::password::hash_password()`.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: 0, // Will be set by the database
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("reporter", "hashed_password");
        assert_eq!(user.id, 0);
        assert_eq!(user.username, "reporter");
        assert_eq!(user.password_hash, "hashed_password");
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new("reporter", "$argon2id$secret");
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("reporter"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
    }
}
