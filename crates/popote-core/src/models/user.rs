//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Stored lowercased and trimmed; uniqueness is case-insensitive.
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Stable image reference served by the file host.
    pub avatar: String,
    pub role: Role,
    /// Blocked users keep read access but may not create or mutate
    /// recipes or interactions. Admins are exempt.
    pub is_blocked: bool,
    /// Free-form dietary preferences (regime tags, goals). Opaque to
    /// moderation logic.
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    /// Argon2id PHC hash (hashing happens in the auth layer).
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

/// Display subset of a user, resolved when populating author and
/// interaction references at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
}

/// Canonical form of an email address: trimmed and lowercased, so the
/// unique index treats addresses case-insensitively.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn normalized_email_is_idempotent() {
        let once = normalize_email("Bob@Mail.org");
        assert_eq!(normalize_email(&once), once);
    }

    #[test]
    fn admin_role_check() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }
}
