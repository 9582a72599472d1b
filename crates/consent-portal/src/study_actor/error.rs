//! Error types for the Study actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StudyError {
    #[error("Study not found: {0}")]
    NotFound(String),

    #[error("Study is not recruiting: {0}")]
    NotRecruiting(String),

    #[error("Study is full: {enrolled} of {max_participants} participants enrolled")]
    StudyFull { enrolled: u32, max_participants: u32 },

    #[error("Study validation error: {0}")]
    ValidationError(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for StudyError {
    fn from(msg: String) -> Self {
        StudyError::ActorCommunicationError(msg)
    }
}
