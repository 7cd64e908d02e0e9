//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Embedded arrays (likes,
//! comments) are defined field-by-field so that targeted updates
//! stay schema-checked.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, Deserialize)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD avatar ON TABLE user TYPE string \
    DEFAULT 'default-avatar.png';
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['User', 'Admin'];
DEFINE FIELD is_blocked ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD preferences ON TABLE user TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Recipes (likes and comments embedded)
-- =======================================================================
DEFINE TABLE recipe SCHEMAFULL;
DEFINE FIELD title ON TABLE recipe TYPE string;
DEFINE FIELD ingredients ON TABLE recipe TYPE array;
DEFINE FIELD ingredients.* ON TABLE recipe TYPE string;
DEFINE FIELD instructions ON TABLE recipe TYPE string;
DEFINE FIELD prep_time ON TABLE recipe TYPE option<string>;
DEFINE FIELD cover_image ON TABLE recipe TYPE option<string>;
DEFINE FIELD status ON TABLE recipe TYPE string \
    ASSERT $value IN ['Pending', 'Accepted', 'Official'];
DEFINE FIELD created_by ON TABLE recipe TYPE option<string>;
DEFINE FIELD likes ON TABLE recipe TYPE array DEFAULT [];
DEFINE FIELD likes.* ON TABLE recipe TYPE string;
DEFINE FIELD comments ON TABLE recipe TYPE array DEFAULT [];
DEFINE FIELD comments.* ON TABLE recipe TYPE object;
DEFINE FIELD comments.*.id ON TABLE recipe TYPE string;
DEFINE FIELD comments.*.author ON TABLE recipe TYPE string;
DEFINE FIELD comments.*.text ON TABLE recipe TYPE string;
DEFINE FIELD comments.*.is_edited ON TABLE recipe TYPE bool;
DEFINE FIELD comments.*.created_at ON TABLE recipe TYPE datetime;
DEFINE FIELD created_at ON TABLE recipe TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE recipe TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_recipe_author ON TABLE recipe COLUMNS created_by;
DEFINE INDEX idx_recipe_status ON TABLE recipe COLUMNS status;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
