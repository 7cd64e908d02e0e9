//! Error types for the Popote platform.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopoteError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Distinguished from [`PopoteError::Forbidden`] so clients can
    /// render a dedicated blocked-account message.
    #[error("account has been blocked by an administrator")]
    Blocked,

    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PopoteResult<T> = Result<T, PopoteError>;
