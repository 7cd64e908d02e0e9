//! Integration tests for the User repository using in-memory
//! SurrealDB.

use popote_core::models::user::{CreateUser, Role, UpdateUser};
use popote_core::repository::{Pagination, UserRepository};
use popote_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    popote_db::run_migrations(&db).await.unwrap();
    db
}

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        email: email.into(),
        password_hash: "$argon2id$test-hash".into(),
        first_name: "Alice".into(),
        last_name: "Martin".into(),
        role: Role::User,
        avatar: None,
        preferences: None,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(new_user("alice@example.com")).await.unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.first_name, "Alice");
    assert_eq!(user.role, Role::User);
    assert!(!user.is_blocked);
    // Schema default applies when no avatar is supplied.
    assert_eq!(user.avatar, "default-avatar.png");

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.email, user.email);
}

#[tokio::test]
async fn get_user_by_email() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let created = repo.create(new_user("bob@example.com")).await.unwrap();

    let fetched = repo.get_by_email("bob@example.com").await.unwrap();
    assert_eq!(fetched.id, created.id);

    let missing = repo.get_by_email("nobody@example.com").await;
    assert!(matches!(
        missing,
        Err(popote_core::PopoteError::NotFound { .. })
    ));
}

#[tokio::test]
async fn duplicate_email_is_rejected_by_unique_index() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(new_user("carol@example.com")).await.unwrap();
    let second = repo.create(new_user("carol@example.com")).await;
    assert!(second.is_err(), "unique email index should reject");
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(new_user("dora@example.com")).await.unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                first_name: Some("Dorothée".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Dorothée");
    assert_eq!(updated.email, "dora@example.com");
    assert_eq!(updated.last_name, "Martin");
    assert!(updated.updated_at >= user.updated_at);
}

#[tokio::test]
async fn set_blocked_toggles_flag() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(new_user("eve@example.com")).await.unwrap();
    assert!(!user.is_blocked);

    let blocked = repo.set_blocked(user.id, true).await.unwrap();
    assert!(blocked.is_blocked);

    let unblocked = repo.set_blocked(user.id, false).await.unwrap();
    assert!(!unblocked.is_blocked);
}

#[tokio::test]
async fn set_blocked_on_missing_user_is_not_found() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let result = repo.set_blocked(Uuid::new_v4(), true).await;
    assert!(matches!(
        result,
        Err(popote_core::PopoteError::NotFound { .. })
    ));
}

#[tokio::test]
async fn delete_removes_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(new_user("frank@example.com")).await.unwrap();
    repo.delete(user.id).await.unwrap();

    let fetched = repo.get_by_id(user.id).await;
    assert!(matches!(
        fetched,
        Err(popote_core::PopoteError::NotFound { .. })
    ));
}

#[tokio::test]
async fn list_returns_all_users_with_total() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let a = repo.create(new_user("a@example.com")).await.unwrap();
    let b = repo.create(new_user("b@example.com")).await.unwrap();

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
    let ids: Vec<_> = page.items.iter().map(|u| u.id).collect();
    assert!(ids.contains(&a.id));
    assert!(ids.contains(&b.id));
}

#[tokio::test]
async fn get_profiles_resolves_known_ids_only() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let a = repo.create(new_user("greta@example.com")).await.unwrap();
    let b = repo.create(new_user("hugo@example.com")).await.unwrap();

    let profiles = repo
        .get_profiles(&[a.id, Uuid::new_v4(), b.id])
        .await
        .unwrap();

    assert_eq!(profiles.len(), 2);
    let greta = profiles.iter().find(|p| p.id == a.id).unwrap();
    assert_eq!(greta.first_name, "Alice");
    assert_eq!(greta.avatar, "default-avatar.png");
}

#[tokio::test]
async fn admin_exists_flips_once_an_admin_is_created() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    assert!(!repo.admin_exists().await.unwrap());

    repo.create(CreateUser {
        role: Role::Admin,
        ..new_user("admin@example.com")
    })
    .await
    .unwrap();

    assert!(repo.admin_exists().await.unwrap());
}
