//! Authorization predicates gating mutating operations.
//!
//! Checks compose in sequence and short-circuit: authenticated, then
//! not blocked, then role/ownership. The underlying service operation
//! is never reached once a check fails.

use uuid::Uuid;

use crate::error::{PopoteError, PopoteResult};
use crate::models::user::{Role, User};

/// The authenticated caller, as established from verified token
/// claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Require an authenticated caller.
pub fn require_actor(actor: Option<Actor>) -> PopoteResult<Actor> {
    actor.ok_or_else(|| PopoteError::Unauthorized {
        reason: "authentication required".into(),
    })
}

/// Reject blocked accounts. Admins are exempt even if the flag is
/// somehow set on them.
pub fn ensure_not_blocked(user: &User) -> PopoteResult<()> {
    if user.is_blocked && !user.role.is_admin() {
        return Err(PopoteError::Blocked);
    }
    Ok(())
}

/// The relationship an actor must hold toward a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    /// Admin role required.
    Admin,
    /// Must be the resource's owner. Ownerless resources (official
    /// recipes) fall through to admins.
    Owner,
    /// Owner, with admin override.
    OwnerOrAdmin,
}

/// Single authorization predicate shared by every owner/role-scoped
/// operation, instead of per-operation ad hoc checks.
pub fn authorize(actor: &Actor, owner: Option<Uuid>, required: Relationship) -> PopoteResult<()> {
    let owns = owner.is_some_and(|o| o == actor.id);
    let allowed = match required {
        Relationship::Admin => actor.is_admin(),
        Relationship::Owner => owns || (owner.is_none() && actor.is_admin()),
        Relationship::OwnerOrAdmin => owns || actor.is_admin(),
    };
    if allowed {
        return Ok(());
    }
    let reason = match required {
        Relationship::Admin => "admin access required",
        Relationship::Owner => "only the owner may perform this action",
        Relationship::OwnerOrAdmin => "only the owner or an admin may perform this action",
    };
    Err(PopoteError::Forbidden {
        reason: reason.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role, blocked: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "u@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            first_name: "U".into(),
            last_name: "Ser".into(),
            avatar: "default-avatar.png".into(),
            role,
            is_blocked: blocked,
            preferences: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_actor_is_unauthorized() {
        let err = require_actor(None).unwrap_err();
        assert!(matches!(err, PopoteError::Unauthorized { .. }));
    }

    #[test]
    fn blocked_user_is_rejected_with_distinguished_error() {
        let err = ensure_not_blocked(&user(Role::User, true)).unwrap_err();
        assert!(matches!(err, PopoteError::Blocked));
    }

    #[test]
    fn blocked_admin_is_still_permitted() {
        assert!(ensure_not_blocked(&user(Role::Admin, true)).is_ok());
    }

    #[test]
    fn admin_check() {
        let admin = Actor {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let plain = Actor {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        assert!(authorize(&admin, None, Relationship::Admin).is_ok());
        assert!(matches!(
            authorize(&plain, None, Relationship::Admin),
            Err(PopoteError::Forbidden { .. })
        ));
    }

    #[test]
    fn owner_check() {
        let actor = Actor {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        assert!(authorize(&actor, Some(actor.id), Relationship::Owner).is_ok());
        assert!(authorize(&actor, Some(Uuid::new_v4()), Relationship::Owner).is_err());
        // Ownerless resources are admin territory.
        assert!(authorize(&actor, None, Relationship::Owner).is_err());
        let admin = Actor {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(authorize(&admin, None, Relationship::Owner).is_ok());
    }

    #[test]
    fn owner_or_admin_allows_either() {
        let owner = Actor {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        let admin = Actor {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let stranger = Actor {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        assert!(authorize(&owner, Some(owner.id), Relationship::OwnerOrAdmin).is_ok());
        assert!(authorize(&admin, Some(owner.id), Relationship::OwnerOrAdmin).is_ok());
        assert!(authorize(&stranger, Some(owner.id), Relationship::OwnerOrAdmin).is_err());
    }
}
