//! Popote Core — domain models, error taxonomy, repository trait
//! definitions, and authorization predicates for the recipe platform.

pub mod access;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{PopoteError, PopoteResult};
