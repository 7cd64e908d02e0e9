//! Recipe domain model: moderation status, embedded likes/comments,
//! and ingredient normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Moderation state of a recipe.
///
/// A single tagged variant rather than independent flags, so a recipe
/// can never be both official and inside the acceptance workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModerationStatus {
    /// User-submitted, awaiting review.
    Pending,
    /// User-submitted and approved by an admin for elevated visibility.
    Accepted,
    /// Authored through the admin path; has no owner and is outside
    /// the acceptance workflow.
    Official,
}

impl ModerationStatus {
    /// Display precedence used as the primary listing sort key:
    /// official first, then accepted, then pending.
    pub fn precedence(self) -> u8 {
        match self {
            ModerationStatus::Official => 2,
            ModerationStatus::Accepted => 1,
            ModerationStatus::Pending => 0,
        }
    }

    pub fn is_official(self) -> bool {
        matches!(self, ModerationStatus::Official)
    }
}

/// A comment embedded in a recipe. Carries its own identity so it can
/// be targeted for edit and delete independently of the parent recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// Immutable once set; only `text` and `is_edited` change after
    /// creation.
    pub author: Uuid,
    pub text: String,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub prep_time: Option<String>,
    /// Reference string returned by the image store.
    pub cover_image: Option<String>,
    pub status: ModerationStatus,
    /// `None` exclusively for official recipes.
    pub created_by: Option<Uuid>,
    /// Set semantics: each user appears at most once.
    pub likes: Vec<Uuid>,
    /// Append-only insertion order.
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    pub fn is_liked_by(&self, user: Uuid) -> bool {
        self.likes.contains(&user)
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}

/// Ingredients as submitted by a client: either an explicit list or a
/// single comma-delimited string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngredientsInput {
    List(Vec<String>),
    Delimited(String),
}

impl IngredientsInput {
    /// Normalize to a list of trimmed, non-empty entries. Delimited
    /// input is split on commas.
    pub fn normalize(self) -> Vec<String> {
        let raw = match self {
            IngredientsInput::List(items) => items,
            IngredientsInput::Delimited(s) => s.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Input for creating a recipe, already normalized and validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub prep_time: Option<String>,
    pub cover_image: Option<String>,
    pub status: ModerationStatus,
    pub created_by: Option<Uuid>,
}

/// Partial update. `None` fields keep the stored value — in
/// particular, an omitted cover image is never cleared implicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRecipe {
    pub title: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub prep_time: Option<String>,
    pub cover_image: Option<String>,
}
