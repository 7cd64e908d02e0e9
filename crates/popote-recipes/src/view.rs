//! Read models: recipes and comments with user references resolved to
//! display profiles.
//!
//! Population is a read-time join against the user collection; nothing
//! is denormalized into the recipe documents. References to users that
//! have since been deleted resolve to `None`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use popote_core::models::recipe::{Comment, ModerationStatus, Recipe};
use popote_core::models::user::UserProfile;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub author: Option<UserProfile>,
    pub text: String,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub prep_time: Option<String>,
    pub cover_image: Option<String>,
    pub status: ModerationStatus,
    pub author: Option<UserProfile>,
    pub likes: Vec<UserProfile>,
    pub like_count: usize,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every user reference a recipe carries: author, likers, and comment
/// authors, deduplicated.
pub(crate) fn collect_user_refs(recipes: &[Recipe]) -> Vec<Uuid> {
    let mut refs = Vec::new();
    for recipe in recipes {
        refs.extend(recipe.created_by);
        refs.extend(recipe.likes.iter().copied());
        refs.extend(recipe.comments.iter().map(|c| c.author));
    }
    refs.sort_unstable();
    refs.dedup();
    refs
}

pub(crate) fn comment_view(comment: Comment, profiles: &HashMap<Uuid, UserProfile>) -> CommentView {
    CommentView {
        id: comment.id,
        author: profiles.get(&comment.author).cloned(),
        text: comment.text,
        is_edited: comment.is_edited,
        created_at: comment.created_at,
    }
}

pub(crate) fn recipe_view(recipe: Recipe, profiles: &HashMap<Uuid, UserProfile>) -> RecipeView {
    RecipeView {
        id: recipe.id,
        title: recipe.title,
        ingredients: recipe.ingredients,
        instructions: recipe.instructions,
        prep_time: recipe.prep_time,
        cover_image: recipe.cover_image,
        status: recipe.status,
        author: recipe
            .created_by
            .and_then(|id| profiles.get(&id).cloned()),
        like_count: recipe.likes.len(),
        likes: recipe
            .likes
            .iter()
            .filter_map(|id| profiles.get(id).cloned())
            .collect(),
        comments: recipe
            .comments
            .into_iter()
            .map(|c| comment_view(c, profiles))
            .collect(),
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    }
}
