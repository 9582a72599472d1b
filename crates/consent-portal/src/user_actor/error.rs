//! Error types for the User actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    /// Another user already holds this personal number.
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("User validation error: {0}")]
    ValidationError(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for UserError {
    fn from(msg: String) -> Self {
        UserError::ActorCommunicationError(msg)
    }
}
