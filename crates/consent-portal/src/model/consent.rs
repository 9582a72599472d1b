use super::study::StudyId;
use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsentId(String);

impl ConsentId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn generate() -> Self {
        Self(format!("consent_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant's answer to a study's consent document.
///
/// Records are never deleted; withdrawal stamps `withdrawn_at` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub id: ConsentId,
    pub user_id: UserId,
    pub study_id: StudyId,
    pub consent_given: bool,
    pub transaction_id: String,
    pub given_at: DateTime<Utc>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub withdrawal_reason: Option<String>,
}

impl ConsentRecord {
    pub fn is_active(&self) -> bool {
        self.consent_given && self.withdrawn_at.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ConsentCreate {
    pub user_id: UserId,
    pub study_id: StudyId,
    pub consent_given: bool,
    /// Reference of the signing transaction that backs this answer.
    pub transaction_id: String,
    pub given_at: DateTime<Utc>,
}
