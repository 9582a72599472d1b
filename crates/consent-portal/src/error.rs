//! # Authentication Errors
//!
//! Every way a login can end without a user. Callers branch on [`AuthError::kind`]
//! rather than on message text.

use crate::model::HintCode;
use serde::Serialize;
use thiserror::Error;

/// Discriminant of [`AuthError`], for logging and for the wire layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthErrorKind {
    Validation,
    Protocol,
    Timeout,
    Backend,
    Cancelled,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// The subject identifier is not a `YYYYMMDD-NNNN` personal number.
    #[error("Invalid personal number format: {input:?}")]
    Validation { input: String },

    /// The provider reported a terminal failure.
    #[error("Bank ID authentication failed: {hint_code}")]
    Protocol { hint_code: HintCode },

    /// Polling used its whole attempt budget without a terminal status.
    #[error("Bank ID authentication timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// A record store or the order registry rejected a read or write.
    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Bank ID authentication was cancelled")]
    Cancelled,
}

impl AuthError {
    pub fn backend(message: impl ToString) -> Self {
        AuthError::Backend {
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::Validation { .. } => AuthErrorKind::Validation,
            AuthError::Protocol { .. } => AuthErrorKind::Protocol,
            AuthError::Timeout { .. } => AuthErrorKind::Timeout,
            AuthError::Backend { .. } => AuthErrorKind::Backend,
            AuthError::Cancelled => AuthErrorKind::Cancelled,
        }
    }

    pub fn hint_code(&self) -> Option<&HintCode> {
        match self {
            AuthError::Protocol { hint_code } => Some(hint_code),
            _ => None,
        }
    }

    /// Whether offering "try again" makes sense. Validation and protocol failures need the
    /// user to change something first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Timeout { .. } | AuthError::Backend { .. })
    }
}
