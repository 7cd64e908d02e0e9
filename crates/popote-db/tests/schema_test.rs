//! Integration tests for schema initialization using in-memory
//! SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    popote_db::run_migrations(&db).await.unwrap();

    // Verify that the tables exist by querying INFO FOR DB.
    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: surrealdb::Value = result.take(0).unwrap();
    let info_str = format!("{info:?}");

    assert!(info_str.contains("user"), "missing user table");
    assert!(info_str.contains("recipe"), "missing recipe table");

    // Verify migration was recorded.
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    // Run twice — should not fail.
    popote_db::run_migrations(&db).await.unwrap();
    popote_db::run_migrations(&db).await.unwrap();

    // Verify only one migration record exists.
    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: surrealdb::Value = result.take(0).unwrap();
    let rendered = format!("{records:?}");
    assert_eq!(
        rendered.matches("initial_schema").count(),
        1,
        "expected exactly one migration record"
    );
}

#[tokio::test]
async fn schema_rejects_unknown_role() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    popote_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE user SET email = 'x@example.com', \
             password_hash = 'h', first_name = 'X', last_name = 'Y', \
             role = 'Superuser'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "role ASSERT should reject unknown values");
}

#[tokio::test]
async fn schema_rejects_unknown_recipe_status() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    popote_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE recipe SET title = 'T', ingredients = ['a'], \
             instructions = 'I', status = 'Draft', likes = [], comments = []",
        )
        .await
        .unwrap()
        .check();

    assert!(
        result.is_err(),
        "status ASSERT should reject unknown values"
    );
}
