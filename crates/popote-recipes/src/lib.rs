//! Popote Recipes — recipe lifecycle, moderation transitions, the
//! like/comment interaction model, and read-time view assembly.

pub mod service;
pub mod view;

pub use service::{LikeOutcome, RecipeChanges, RecipeDraft, RecipeService};
pub use view::{CommentView, RecipeView};
