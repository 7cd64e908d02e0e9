//! Authentication error types.

use popote_core::error::PopoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("password confirmation does not match")]
    PasswordMismatch,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for PopoteError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => PopoteError::Unauthorized {
                reason: err.to_string(),
            },
            AuthError::WeakPassword { .. } | AuthError::PasswordMismatch => {
                PopoteError::Validation {
                    message: err.to_string(),
                }
            }
            AuthError::Crypto(msg) => PopoteError::Crypto(msg),
        }
    }
}
