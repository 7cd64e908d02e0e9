//! Database-specific error types and conversions.

use popote_core::error::PopoteError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Malformed record: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for PopoteError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => PopoteError::NotFound { entity, id },
            other => PopoteError::Database(other.to_string()),
        }
    }
}
