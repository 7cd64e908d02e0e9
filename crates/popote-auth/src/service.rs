//! Account service — signup, login, profile management, and the
//! admin user-moderation surface.
//!
//! Generic over the user repository so the auth layer has no
//! dependency on the database crate.

use popote_core::access::{self, Actor, Relationship};
use popote_core::error::{PopoteError, PopoteResult};
use popote_core::models::user::{CreateUser, Role, UpdateUser, User, normalize_email};
use popote_core::repository::{PaginatedResult, Pagination, UserRepository};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the public signup flow.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub preferences: Option<serde_json::Value>,
}

/// Input for the admin user-creation path.
#[derive(Debug, Clone)]
pub struct AdminNewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

/// Profile fields a user may change on their own account.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

/// Fields an admin may change on any user account.
#[derive(Debug, Clone, Default)]
pub struct AdminUserChanges {
    pub email: Option<String>,
    /// Raw replacement password; hashed before storage.
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

/// Successful authentication result.
#[derive(Debug, Clone)]
pub struct AuthOutput {
    /// Signed JWT access token carrying `{sub, role}`.
    pub token: String,
    pub user: User,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

pub struct AccountService<U: UserRepository> {
    users: U,
    config: AuthConfig,
}

impl<U: UserRepository> AccountService<U> {
    pub fn new(users: U, config: AuthConfig) -> Self {
        Self { users, config }
    }

    fn require(value: &str, name: &str) -> PopoteResult<()> {
        if value.trim().is_empty() {
            return Err(PopoteError::Validation {
                message: format!("{name} is required"),
            });
        }
        Ok(())
    }

    fn check_password_policy(&self, password: &str) -> PopoteResult<()> {
        if password.len() < self.config.min_password_length {
            return Err(AuthError::WeakPassword {
                min: self.config.min_password_length,
            }
            .into());
        }
        Ok(())
    }

    /// Reject an email already held by another account. `excluding`
    /// allows a user to keep their own address on profile updates.
    async fn ensure_email_free(&self, email: &str, excluding: Option<Uuid>) -> PopoteResult<()> {
        match self.users.get_by_email(email).await {
            Ok(existing) if Some(existing.id) != excluding => Err(PopoteError::AlreadyExists {
                entity: "user".into(),
            }),
            Ok(_) => Ok(()),
            Err(PopoteError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn issue(&self, user: User) -> PopoteResult<AuthOutput> {
        let token = token::issue_access_token(user.id, user.role, &self.config)?;
        Ok(AuthOutput {
            token,
            user,
            expires_in: self.config.token_lifetime_secs,
        })
    }

    /// Register a new account (role defaults to `User`) and issue a
    /// token.
    pub async fn signup(&self, input: NewAccount) -> PopoteResult<AuthOutput> {
        Self::require(&input.email, "email")?;
        Self::require(&input.password, "password")?;
        Self::require(&input.first_name, "first name")?;
        Self::require(&input.last_name, "last name")?;
        self.check_password_policy(&input.password)?;

        let email = normalize_email(&input.email);
        self.ensure_email_free(&email, None).await?;

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;
        let user = self
            .users
            .create(CreateUser {
                email,
                password_hash,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                role: Role::User,
                avatar: None,
                preferences: input.preferences,
            })
            .await?;

        self.issue(user)
    }

    /// Authenticate with email + password. Blocked accounts may still
    /// log in — they keep read access and are stopped at the mutation
    /// boundary instead.
    pub async fn login(&self, email: &str, raw_password: &str) -> PopoteResult<AuthOutput> {
        let user = self.lookup_credentials(email, raw_password).await?;
        self.issue(user)
    }

    /// As [`AccountService::login`], but only admin accounts pass.
    pub async fn admin_login(&self, email: &str, raw_password: &str) -> PopoteResult<AuthOutput> {
        let email = normalize_email(email);
        let user = self
            .users
            .get_by_email(&email)
            .await
            .map_err(|_| AuthError::InvalidCredentials)?;

        if !user.role.is_admin() {
            return Err(PopoteError::Forbidden {
                reason: "administrator access required".into(),
            });
        }

        self.verify(&user, raw_password)?;
        self.issue(user)
    }

    async fn lookup_credentials(&self, email: &str, raw_password: &str) -> PopoteResult<User> {
        let email = normalize_email(email);
        let user = self
            .users
            .get_by_email(&email)
            .await
            .map_err(|_| AuthError::InvalidCredentials)?;
        self.verify(&user, raw_password)?;
        Ok(user)
    }

    fn verify(&self, user: &User, raw_password: &str) -> PopoteResult<()> {
        let valid = password::verify_password(
            raw_password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(())
    }

    /// The acting user's own account.
    pub async fn me(&self, actor: Actor) -> PopoteResult<User> {
        self.users.get_by_id(actor.id).await
    }

    /// Update the acting user's own profile fields.
    pub async fn update_profile(&self, actor: Actor, changes: ProfileChanges) -> PopoteResult<User> {
        let email = match changes.email {
            Some(raw) => {
                Self::require(&raw, "email")?;
                let normalized = normalize_email(&raw);
                self.ensure_email_free(&normalized, Some(actor.id)).await?;
                Some(normalized)
            }
            None => None,
        };

        self.users
            .update(
                actor.id,
                UpdateUser {
                    email,
                    password_hash: None,
                    first_name: changes.first_name,
                    last_name: changes.last_name,
                    avatar: changes.avatar,
                    preferences: changes.preferences,
                },
            )
            .await
    }

    /// Change the acting user's password after re-verifying the
    /// current one.
    pub async fn change_password(
        &self,
        actor: Actor,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> PopoteResult<()> {
        Self::require(current, "current password")?;
        Self::require(new, "new password")?;
        Self::require(confirm, "password confirmation")?;
        if new != confirm {
            return Err(AuthError::PasswordMismatch.into());
        }
        self.check_password_policy(new)?;

        let user = self.users.get_by_id(actor.id).await?;
        self.verify(&user, current)?;

        let password_hash = password::hash_password(new, self.config.pepper.as_deref())?;
        self.users
            .update(
                actor.id,
                UpdateUser {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Admin user moderation
    // -------------------------------------------------------------------

    /// Admin path for creating a user account directly.
    pub async fn create_user(&self, actor: Actor, input: AdminNewUser) -> PopoteResult<User> {
        access::authorize(&actor, None, Relationship::Admin)?;
        Self::require(&input.email, "email")?;
        Self::require(&input.password, "password")?;
        self.check_password_policy(&input.password)?;

        let email = normalize_email(&input.email);
        self.ensure_email_free(&email, None).await?;

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;
        self.users
            .create(CreateUser {
                email,
                password_hash,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                role: Role::User,
                avatar: input.avatar,
                preferences: None,
            })
            .await
    }

    /// Admin edit of any user account, optionally resetting the
    /// password.
    pub async fn update_user(
        &self,
        actor: Actor,
        user_id: Uuid,
        changes: AdminUserChanges,
    ) -> PopoteResult<User> {
        access::authorize(&actor, None, Relationship::Admin)?;

        let email = match changes.email {
            Some(raw) => {
                let normalized = normalize_email(&raw);
                self.ensure_email_free(&normalized, Some(user_id)).await?;
                Some(normalized)
            }
            None => None,
        };

        let password_hash = match changes.password {
            Some(raw) => {
                self.check_password_policy(&raw)?;
                Some(password::hash_password(&raw, self.config.pepper.as_deref())?)
            }
            None => None,
        };

        self.users
            .update(
                user_id,
                UpdateUser {
                    email,
                    password_hash,
                    first_name: changes.first_name,
                    last_name: changes.last_name,
                    avatar: changes.avatar,
                    preferences: None,
                },
            )
            .await
    }

    /// Block or unblock a user. Admin accounts are never blockable.
    pub async fn set_blocked(&self, actor: Actor, user_id: Uuid, blocked: bool) -> PopoteResult<User> {
        access::authorize(&actor, None, Relationship::Admin)?;
        let target = self.users.get_by_id(user_id).await?;
        if target.role.is_admin() {
            return Err(PopoteError::Forbidden {
                reason: "administrator accounts cannot be blocked".into(),
            });
        }
        self.users.set_blocked(user_id, blocked).await
    }

    /// Delete a user account. Admin accounts are never deletable
    /// through this surface.
    pub async fn delete_user(&self, actor: Actor, user_id: Uuid) -> PopoteResult<()> {
        access::authorize(&actor, None, Relationship::Admin)?;
        let target = self.users.get_by_id(user_id).await?;
        if target.role.is_admin() {
            return Err(PopoteError::Forbidden {
                reason: "administrator accounts cannot be deleted".into(),
            });
        }
        self.users.delete(user_id).await
    }

    pub async fn get_user(&self, actor: Actor, user_id: Uuid) -> PopoteResult<User> {
        access::authorize(&actor, None, Relationship::Admin)?;
        self.users.get_by_id(user_id).await
    }

    pub async fn list_users(
        &self,
        actor: Actor,
        pagination: Pagination,
    ) -> PopoteResult<PaginatedResult<User>> {
        access::authorize(&actor, None, Relationship::Admin)?;
        self.users.list(pagination).await
    }

    /// Idempotent initial-admin creation, run at server startup. Does
    /// nothing if any admin account already exists.
    pub async fn bootstrap_admin(&self, email: &str, raw_password: &str) -> PopoteResult<Option<User>> {
        if self.users.admin_exists().await? {
            return Ok(None);
        }

        Self::require(email, "email")?;
        Self::require(raw_password, "password")?;
        self.check_password_policy(raw_password)?;

        let email = normalize_email(email);
        self.ensure_email_free(&email, None).await?;

        let password_hash = password::hash_password(raw_password, self.config.pepper.as_deref())?;
        let admin = self
            .users
            .create(CreateUser {
                email,
                password_hash,
                first_name: "Admin".into(),
                last_name: "Admin".into(),
                role: Role::Admin,
                avatar: None,
                preferences: None,
            })
            .await?;
        Ok(Some(admin))
    }
}
