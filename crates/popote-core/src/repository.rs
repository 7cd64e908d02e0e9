//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Interaction mutations
//! (likes, comments) are contractually atomic: implementations must
//! modify the targeted embedded element server-side rather than
//! round-tripping the whole document, so concurrent writers never
//! lose each other's updates.

use uuid::Uuid;

use crate::error::PopoteResult;
use crate::models::{
    recipe::{CreateRecipe, ModerationStatus, Recipe, UpdateRecipe},
    user::{CreateUser, UpdateUser, User, UserProfile},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> PaginatedResult<T> {
    /// Map items while keeping the page envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// Query filters for recipe listings.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Restrict to recipes authored by this user ("my recipes").
    pub author: Option<Uuid>,
    pub status: Option<ModerationStatus>,
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = PopoteResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PopoteResult<User>> + Send;
    /// Lookup by normalized (trimmed, lowercased) email.
    fn get_by_email(&self, email: &str) -> impl Future<Output = PopoteResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = PopoteResult<User>> + Send;
    /// Moderation toggle, separate from profile updates.
    fn set_blocked(
        &self,
        id: Uuid,
        blocked: bool,
    ) -> impl Future<Output = PopoteResult<User>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = PopoteResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = PopoteResult<PaginatedResult<User>>> + Send;
    /// Read-time join support: resolve user references to their
    /// display subset. Unknown ids are silently absent from the
    /// result.
    fn get_profiles(
        &self,
        ids: &[Uuid],
    ) -> impl Future<Output = PopoteResult<Vec<UserProfile>>> + Send;
    /// Whether any admin account exists (initial-admin bootstrap).
    fn admin_exists(&self) -> impl Future<Output = PopoteResult<bool>> + Send;
}

pub trait RecipeRepository: Send + Sync {
    fn create(&self, input: CreateRecipe) -> impl Future<Output = PopoteResult<Recipe>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PopoteResult<Recipe>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateRecipe,
    ) -> impl Future<Output = PopoteResult<Recipe>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = PopoteResult<()>> + Send;
    fn set_status(
        &self,
        id: Uuid,
        status: ModerationStatus,
    ) -> impl Future<Output = PopoteResult<Recipe>> + Send;
    /// Ordered by display precedence (official, accepted, pending)
    /// then recency. Each call re-runs the query; nothing is cached.
    fn list(
        &self,
        filter: RecipeFilter,
        pagination: Pagination,
    ) -> impl Future<Output = PopoteResult<PaginatedResult<Recipe>>> + Send;

    /// Atomic like toggle: insert the user into the like set if
    /// absent, remove otherwise. Returns the post-update recipe.
    fn toggle_like(
        &self,
        id: Uuid,
        user: Uuid,
    ) -> impl Future<Output = PopoteResult<Recipe>> + Send;
    /// Atomic append of a new comment with a DB-assigned timestamp.
    fn push_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
        author: Uuid,
        text: String,
    ) -> impl Future<Output = PopoteResult<Recipe>> + Send;
    /// Targeted in-array edit: sets `text` and `is_edited`, leaving
    /// `author` and `created_at` untouched.
    fn update_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> impl Future<Output = PopoteResult<Recipe>> + Send;
    /// Targeted removal preserving the order of remaining comments.
    fn remove_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
    ) -> impl Future<Output = PopoteResult<Recipe>> + Send;
}
