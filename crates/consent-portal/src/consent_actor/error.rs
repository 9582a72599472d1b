//! Error types for the Consent actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConsentError {
    #[error("Consent not found: {0}")]
    NotFound(String),

    #[error("Invalid user: {0}")]
    InvalidUser(String),

    #[error("User is not verified: {0}")]
    UnverifiedUser(String),

    #[error("Invalid study: {0}")]
    InvalidStudy(String),

    #[error("Study is not recruiting: {0}")]
    StudyNotRecruiting(String),

    /// The study rejected the enrollment, typically because it is full.
    #[error("Enrollment failed: {0}")]
    EnrollmentFailed(String),

    /// The user already has an active consent for the study.
    #[error("Consent already answered: {0}")]
    AlreadyAnswered(String),

    /// The study slot could not be freed; the consent stays active.
    #[error("Release failed: {0}")]
    ReleaseFailed(String),

    #[error("Consent was never given: {0}")]
    NotGiven(String),

    #[error("Consent already withdrawn: {0}")]
    AlreadyWithdrawn(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for ConsentError {
    fn from(msg: String) -> Self {
        ConsentError::ActorCommunicationError(msg)
    }
}
