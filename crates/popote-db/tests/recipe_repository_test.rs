//! Integration tests for the Recipe repository using in-memory
//! SurrealDB.

use popote_core::models::recipe::{CreateRecipe, ModerationStatus, UpdateRecipe};
use popote_core::models::user::{CreateUser, Role};
use popote_core::repository::{
    Pagination, RecipeFilter, RecipeRepository, UserRepository,
};
use popote_db::repository::{SurrealRecipeRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create an author.
async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    popote_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let author = users
        .create(CreateUser {
            email: "cook@example.com".into(),
            password_hash: "$argon2id$test-hash".into(),
            first_name: "Paul".into(),
            last_name: "Bocuse".into(),
            role: Role::User,
            avatar: None,
            preferences: None,
        })
        .await
        .unwrap();

    (db, author.id)
}

fn draft(title: &str, author: Option<Uuid>, status: ModerationStatus) -> CreateRecipe {
    CreateRecipe {
        title: title.into(),
        ingredients: vec!["flour".into(), "eggs".into()],
        instructions: "Mix and bake.".into(),
        prep_time: Some("45 min".into()),
        cover_image: None,
        status,
        created_by: author,
    }
}

#[tokio::test]
async fn create_and_get_recipe() {
    let (db, author) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let recipe = repo
        .create(draft("Crêpes", Some(author), ModerationStatus::Pending))
        .await
        .unwrap();

    assert_eq!(recipe.title, "Crêpes");
    assert_eq!(recipe.ingredients, vec!["flour", "eggs"]);
    assert_eq!(recipe.status, ModerationStatus::Pending);
    assert_eq!(recipe.created_by, Some(author));
    assert!(recipe.likes.is_empty());
    assert!(recipe.comments.is_empty());

    let fetched = repo.get_by_id(recipe.id).await.unwrap();
    assert_eq!(fetched.id, recipe.id);
    assert_eq!(fetched.prep_time.as_deref(), Some("45 min"));
}

#[tokio::test]
async fn official_recipe_has_no_author() {
    let (db, _) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let recipe = repo
        .create(draft("Pot-au-feu", None, ModerationStatus::Official))
        .await
        .unwrap();

    assert_eq!(recipe.status, ModerationStatus::Official);
    assert_eq!(recipe.created_by, None);
}

#[tokio::test]
async fn missing_recipe_is_not_found() {
    let (db, _) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let result = repo.get_by_id(Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(popote_core::PopoteError::NotFound { .. })
    ));

    let result = repo
        .set_status(Uuid::new_v4(), ModerationStatus::Accepted)
        .await;
    assert!(matches!(
        result,
        Err(popote_core::PopoteError::NotFound { .. })
    ));
}

#[tokio::test]
async fn update_keeps_cover_image_when_omitted() {
    let (db, author) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let recipe = repo
        .create(CreateRecipe {
            cover_image: Some("cover-1.jpg".into()),
            ..draft("Quiche", Some(author), ModerationStatus::Pending)
        })
        .await
        .unwrap();

    // Title-only edit: the stored image reference must survive.
    let updated = repo
        .update(
            recipe.id,
            UpdateRecipe {
                title: Some("Quiche lorraine".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Quiche lorraine");
    assert_eq!(updated.cover_image.as_deref(), Some("cover-1.jpg"));

    // Supplying a replacement swaps it.
    let replaced = repo
        .update(
            recipe.id,
            UpdateRecipe {
                cover_image: Some("cover-2.jpg".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(replaced.cover_image.as_deref(), Some("cover-2.jpg"));
}

#[tokio::test]
async fn set_status_transitions() {
    let (db, author) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let recipe = repo
        .create(draft("Ratatouille", Some(author), ModerationStatus::Pending))
        .await
        .unwrap();

    let accepted = repo
        .set_status(recipe.id, ModerationStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted.status, ModerationStatus::Accepted);

    let reverted = repo
        .set_status(recipe.id, ModerationStatus::Pending)
        .await
        .unwrap();
    assert_eq!(reverted.status, ModerationStatus::Pending);
}

#[tokio::test]
async fn delete_removes_recipe() {
    let (db, author) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let recipe = repo
        .create(draft("Soupe", Some(author), ModerationStatus::Pending))
        .await
        .unwrap();
    repo.delete(recipe.id).await.unwrap();

    let fetched = repo.get_by_id(recipe.id).await;
    assert!(matches!(
        fetched,
        Err(popote_core::PopoteError::NotFound { .. })
    ));
}

#[tokio::test]
async fn list_orders_official_then_accepted_then_pending() {
    let (db, author) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    // Created oldest-first, in inverse display order: the sort must
    // come from moderation precedence, not recency.
    let official = repo
        .create(draft("Official, oldest", None, ModerationStatus::Official))
        .await
        .unwrap();
    let accepted = repo
        .create(draft("Accepted, newer", Some(author), ModerationStatus::Accepted))
        .await
        .unwrap();
    let pending = repo
        .create(draft("Pending, newest", Some(author), ModerationStatus::Pending))
        .await
        .unwrap();

    let page = repo
        .list(RecipeFilter::default(), Pagination::default())
        .await
        .unwrap();

    let ids: Vec<_> = page.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![official.id, accepted.id, pending.id]);
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn list_breaks_ties_by_recency() {
    let (db, author) = setup().await;
    let repo = SurrealRecipeRepository::new(db);

    let older = repo
        .create(draft("Older pending", Some(author), ModerationStatus::Pending))
        .await
        .unwrap();
    let newer = repo
        .create(draft("Newer pending", Some(author), ModerationStatus::Pending))
        .await
        .unwrap();

    let page = repo
        .list(RecipeFilter::default(), Pagination::default())
        .await
        .unwrap();

    let ids: Vec<_> = page.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn list_filters_by_author() {
    let (db, author) = setup().await;
    let users = SurrealUserRepository::new(db.clone());
    let other = users
        .create(CreateUser {
            email: "other@example.com".into(),
            password_hash: "$argon2id$test-hash".into(),
            first_name: "Julia".into(),
            last_name: "Child".into(),
            role: Role::User,
            avatar: None,
            preferences: None,
        })
        .await
        .unwrap();

    let repo = SurrealRecipeRepository::new(db);
    let mine = repo
        .create(draft("Mine", Some(author), ModerationStatus::Pending))
        .await
        .unwrap();
    repo.create(draft("Theirs", Some(other.id), ModerationStatus::Pending))
        .await
        .unwrap();

    let page = repo
        .list(
            RecipeFilter {
                author: Some(author),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, mine.id);
}
