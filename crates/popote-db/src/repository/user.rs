//! SurrealDB implementation of [`UserRepository`].
//!
//! Emails are expected pre-normalized (trimmed, lowercased) by the
//! service layer; the unique index on `email` then gives
//! case-insensitive uniqueness.

use chrono::{DateTime, Utc};
use popote_core::error::PopoteResult;
use popote_core::models::user::{CreateUser, Role, UpdateUser, User, UserProfile};
use popote_core::repository::{PaginatedResult, Pagination, UserRepository};
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct UserRow {
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    avatar: String,
    role: String,
    is_blocked: bool,
    preferences: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct UserRowWithId {
    record_id: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    avatar: String,
    role: String,
    is_blocked: bool,
    preferences: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row struct for profile population queries.
#[derive(Debug, Deserialize)]
struct ProfileRow {
    record_id: String,
    first_name: String,
    last_name: String,
    avatar: String,
}

/// Row struct for count queries.
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "User" => Ok(Role::User),
        "Admin" => Ok(Role::Admin),
        other => Err(DbError::Corrupt(format!("unknown user role: {other}"))),
    }
}

fn role_to_string(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Admin => "Admin",
    }
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            avatar: self.avatar,
            role: parse_role(&self.role)?,
            is_blocked: self.is_blocked,
            preferences: self.preferences,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            avatar: self.avatar,
            role: parse_role(&self.role)?,
            is_blocked: self.is_blocked,
            preferences: self.preferences,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> PopoteResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut sets = vec![
            "email = $email",
            "password_hash = $password_hash",
            "first_name = $first_name",
            "last_name = $last_name",
            "role = $role",
            "is_blocked = false",
        ];
        if input.avatar.is_some() {
            sets.push("avatar = $avatar");
        }
        if input.preferences.is_some() {
            sets.push("preferences = $preferences");
        }

        let query = format!("CREATE type::thing('user', $id) SET {}", sets.join(", "));

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("password_hash", input.password_hash))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("role", role_to_string(input.role).to_string()));

        if let Some(avatar) = input.avatar {
            builder = builder.bind(("avatar", avatar));
        }
        if let Some(preferences) = input.preferences {
            builder = builder.bind(("preferences", preferences));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PopoteResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_email(&self, email: &str) -> PopoteResult<User> {
        let email_owned = email.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> PopoteResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.avatar.is_some() {
            sets.push("avatar = $avatar");
        }
        if input.preferences.is_some() {
            sets.push("preferences = $preferences");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::thing('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(password_hash) = input.password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }
        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(avatar) = input.avatar {
            builder = builder.bind(("avatar", avatar));
        }
        if let Some(preferences) = input.preferences {
            builder = builder.bind(("preferences", preferences));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn set_blocked(&self, id: Uuid, blocked: bool) -> PopoteResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::thing('user', $id) SET \
                 is_blocked = $blocked, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("blocked", blocked))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn delete(&self, id: Uuid) -> PopoteResult<()> {
        self.db
            .query("DELETE type::thing('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> PopoteResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn get_profiles(&self, ids: &[Uuid]) -> PopoteResult<Vec<UserProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let id_strings: Vec<String> = ids.iter().map(ToString::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, first_name, last_name, avatar \
                 FROM user WHERE meta::id(id) IN $ids",
            )
            .bind(("ids", id_strings))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| {
                let id = Uuid::parse_str(&row.record_id)
                    .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
                Ok(UserProfile {
                    id,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    avatar: row.avatar,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn admin_exists(&self) -> PopoteResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE role = 'Admin' GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}
