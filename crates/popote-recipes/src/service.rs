//! Recipe service — lifecycle, moderation transitions, and the
//! like/comment interaction model.
//!
//! Generic over repository implementations so the service layer has no
//! dependency on the database crate. Every mutating operation runs the
//! access pipeline first: authenticated actor, block check, then the
//! role/ownership predicate.

use std::collections::HashMap;

use popote_core::access::{self, Actor, Relationship};
use popote_core::error::{PopoteError, PopoteResult};
use popote_core::models::recipe::{
    CreateRecipe, IngredientsInput, ModerationStatus, Recipe, UpdateRecipe,
};
use popote_core::models::user::{User, UserProfile};
use popote_core::repository::{
    PaginatedResult, Pagination, RecipeFilter, RecipeRepository, UserRepository,
};
use uuid::Uuid;

use crate::view::{self, CommentView, RecipeView};

/// A recipe as submitted for creation.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub title: String,
    pub ingredients: IngredientsInput,
    pub instructions: String,
    pub prep_time: Option<String>,
    /// Reference returned by the image store, if one was uploaded.
    pub cover_image: Option<String>,
}

/// Partial edit of an existing recipe. An omitted cover image keeps
/// the stored reference.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub ingredients: Option<IngredientsInput>,
    pub instructions: Option<String>,
    pub prep_time: Option<String>,
    pub cover_image: Option<String>,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    /// Like count after the toggle.
    pub likes: usize,
    /// Whether the acting user likes the recipe now.
    pub liked: bool,
}

pub struct RecipeService<R: RecipeRepository, U: UserRepository> {
    recipes: R,
    users: U,
}

impl<R: RecipeRepository, U: UserRepository> RecipeService<R, U> {
    pub fn new(recipes: R, users: U) -> Self {
        Self { recipes, users }
    }

    /// Look up the acting account and reject blocked users (admins
    /// exempt). Every mutation starts here.
    async fn acting_user(&self, actor: &Actor) -> PopoteResult<User> {
        let user = self.users.get_by_id(actor.id).await?;
        access::ensure_not_blocked(&user)?;
        Ok(user)
    }

    fn require_text(value: &str, name: &str) -> PopoteResult<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PopoteError::Validation {
                message: format!("{name} is required"),
            });
        }
        Ok(trimmed.to_string())
    }

    fn validate_draft(
        draft: RecipeDraft,
        status: ModerationStatus,
        created_by: Option<Uuid>,
    ) -> PopoteResult<CreateRecipe> {
        let title = Self::require_text(&draft.title, "title")?;
        let instructions = Self::require_text(&draft.instructions, "instructions")?;
        let ingredients = draft.ingredients.normalize();
        if ingredients.is_empty() {
            return Err(PopoteError::Validation {
                message: "at least one ingredient is required".into(),
            });
        }
        Ok(CreateRecipe {
            title,
            ingredients,
            instructions,
            prep_time: draft.prep_time,
            cover_image: draft.cover_image,
            status,
            created_by,
        })
    }

    async fn profiles_for(&self, recipes: &[Recipe]) -> PopoteResult<HashMap<Uuid, UserProfile>> {
        let refs = view::collect_user_refs(recipes);
        let profiles = self.users.get_profiles(&refs).await?;
        Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Publish a user-submitted recipe. Starts in the pending
    /// moderation state.
    pub async fn create(&self, actor: Actor, draft: RecipeDraft) -> PopoteResult<Recipe> {
        self.acting_user(&actor).await?;
        let input = Self::validate_draft(draft, ModerationStatus::Pending, Some(actor.id))?;
        self.recipes.create(input).await
    }

    /// Publish an official recipe through the admin path. Official
    /// recipes carry no author.
    pub async fn create_official(&self, actor: Actor, draft: RecipeDraft) -> PopoteResult<Recipe> {
        access::authorize(&actor, None, Relationship::Admin)?;
        let input = Self::validate_draft(draft, ModerationStatus::Official, None)?;
        self.recipes.create(input).await
    }

    /// Edit a recipe. Only the author may edit their recipe;
    /// ownerless (official) recipes are editable by admins.
    pub async fn edit(
        &self,
        actor: Actor,
        recipe_id: Uuid,
        changes: RecipeChanges,
    ) -> PopoteResult<Recipe> {
        self.acting_user(&actor).await?;
        let recipe = self.recipes.get_by_id(recipe_id).await?;
        access::authorize(&actor, recipe.created_by, Relationship::Owner)?;

        let title = changes
            .title
            .map(|t| Self::require_text(&t, "title"))
            .transpose()?;
        let instructions = changes
            .instructions
            .map(|i| Self::require_text(&i, "instructions"))
            .transpose()?;
        let ingredients = match changes.ingredients {
            Some(input) => {
                let normalized = input.normalize();
                if normalized.is_empty() {
                    return Err(PopoteError::Validation {
                        message: "at least one ingredient is required".into(),
                    });
                }
                Some(normalized)
            }
            None => None,
        };

        self.recipes
            .update(
                recipe_id,
                UpdateRecipe {
                    title,
                    ingredients,
                    instructions,
                    prep_time: changes.prep_time,
                    cover_image: changes.cover_image,
                },
            )
            .await
    }

    /// Delete a recipe: its author, or an admin as a moderation
    /// action.
    pub async fn delete(&self, actor: Actor, recipe_id: Uuid) -> PopoteResult<()> {
        self.acting_user(&actor).await?;
        let recipe = self.recipes.get_by_id(recipe_id).await?;
        access::authorize(&actor, recipe.created_by, Relationship::OwnerOrAdmin)?;
        self.recipes.delete(recipe_id).await
    }

    /// Admin acceptance toggle for user-submitted recipes. Official
    /// recipes are outside the acceptance workflow.
    pub async fn set_accepted(
        &self,
        actor: Actor,
        recipe_id: Uuid,
        accepted: bool,
    ) -> PopoteResult<Recipe> {
        access::authorize(&actor, None, Relationship::Admin)?;
        let recipe = self.recipes.get_by_id(recipe_id).await?;
        if recipe.status.is_official() {
            return Err(PopoteError::InvalidState {
                message: "cannot change acceptance of an official recipe".into(),
            });
        }
        let status = if accepted {
            ModerationStatus::Accepted
        } else {
            ModerationStatus::Pending
        };
        self.recipes.set_status(recipe_id, status).await
    }

    /// A single recipe with author and interaction references
    /// resolved.
    pub async fn get(&self, recipe_id: Uuid) -> PopoteResult<RecipeView> {
        let recipe = self.recipes.get_by_id(recipe_id).await?;
        let profiles = self.profiles_for(std::slice::from_ref(&recipe)).await?;
        Ok(view::recipe_view(recipe, &profiles))
    }

    /// Recipes in display order: official first, then accepted, then
    /// pending, newest first within each tier.
    pub async fn list(
        &self,
        filter: RecipeFilter,
        pagination: Pagination,
    ) -> PopoteResult<PaginatedResult<RecipeView>> {
        let page = self.recipes.list(filter, pagination).await?;
        let profiles = self.profiles_for(&page.items).await?;
        Ok(page.map(|recipe| view::recipe_view(recipe, &profiles)))
    }

    /// The acting user's own recipes.
    pub async fn list_mine(
        &self,
        actor: Actor,
        pagination: Pagination,
    ) -> PopoteResult<PaginatedResult<RecipeView>> {
        self.list(
            RecipeFilter {
                author: Some(actor.id),
                ..Default::default()
            },
            pagination,
        )
        .await
    }

    // -------------------------------------------------------------------
    // Interactions
    // -------------------------------------------------------------------

    /// Toggle the acting user's like on a recipe. Calling twice
    /// returns the recipe to its original like state.
    pub async fn toggle_like(&self, actor: Actor, recipe_id: Uuid) -> PopoteResult<LikeOutcome> {
        self.acting_user(&actor).await?;
        let after = self.recipes.toggle_like(recipe_id, actor.id).await?;
        Ok(LikeOutcome {
            likes: after.likes.len(),
            liked: after.is_liked_by(actor.id),
        })
    }

    /// Append a comment to a recipe.
    pub async fn add_comment(
        &self,
        actor: Actor,
        recipe_id: Uuid,
        text: &str,
    ) -> PopoteResult<CommentView> {
        self.acting_user(&actor).await?;
        let text = Self::require_text(text, "comment text")?;

        let comment_id = Uuid::new_v4();
        let after = self
            .recipes
            .push_comment(recipe_id, comment_id, actor.id, text)
            .await?;
        self.resolve_comment(&after, comment_id).await
    }

    /// Edit a comment's text. Author-only; the author reference and
    /// timestamp never change, and `is_edited` is set.
    pub async fn edit_comment(
        &self,
        actor: Actor,
        recipe_id: Uuid,
        comment_id: Uuid,
        text: &str,
    ) -> PopoteResult<CommentView> {
        self.acting_user(&actor).await?;
        let text = Self::require_text(text, "comment text")?;

        let recipe = self.recipes.get_by_id(recipe_id).await?;
        let comment = recipe.comment(comment_id).ok_or_else(|| {
            PopoteError::NotFound {
                entity: "comment".into(),
                id: comment_id.to_string(),
            }
        })?;
        access::authorize(&actor, Some(comment.author), Relationship::Owner)?;

        let after = self
            .recipes
            .update_comment(recipe_id, comment_id, text)
            .await?;
        self.resolve_comment(&after, comment_id).await
    }

    /// Remove a comment: its author, or an admin as a moderation
    /// action. Remaining comments keep their relative order.
    pub async fn delete_comment(
        &self,
        actor: Actor,
        recipe_id: Uuid,
        comment_id: Uuid,
    ) -> PopoteResult<()> {
        self.acting_user(&actor).await?;

        let recipe = self.recipes.get_by_id(recipe_id).await?;
        let comment = recipe.comment(comment_id).ok_or_else(|| {
            PopoteError::NotFound {
                entity: "comment".into(),
                id: comment_id.to_string(),
            }
        })?;
        access::authorize(&actor, Some(comment.author), Relationship::OwnerOrAdmin)?;

        self.recipes.remove_comment(recipe_id, comment_id).await?;
        Ok(())
    }

    async fn resolve_comment(&self, recipe: &Recipe, comment_id: Uuid) -> PopoteResult<CommentView> {
        let comment = recipe
            .comment(comment_id)
            .ok_or_else(|| PopoteError::NotFound {
                entity: "comment".into(),
                id: comment_id.to_string(),
            })?
            .clone();
        let profiles = self
            .users
            .get_profiles(std::slice::from_ref(&comment.author))
            .await?;
        let profiles: HashMap<Uuid, UserProfile> =
            profiles.into_iter().map(|p| (p.id, p)).collect();
        Ok(view::comment_view(comment, &profiles))
    }
}
