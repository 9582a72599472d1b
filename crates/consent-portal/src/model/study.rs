use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyId(String);

impl StudyId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn generate() -> Self {
        Self(format!("study_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    pub id: StudyId,
    pub title: String,
    pub description: Option<String>,
    pub status: StudyStatus,
    pub max_participants: u32,
    pub enrolled: u32,
    pub consent_document: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Study {
    pub fn is_recruiting(&self) -> bool {
        self.status == StudyStatus::Active && self.enrolled < self.max_participants
    }

    pub fn remaining_slots(&self) -> u32 {
        self.max_participants.saturating_sub(self.enrolled)
    }
}

#[derive(Debug, Clone)]
pub struct StudyCreate {
    pub title: String,
    pub description: Option<String>,
    pub status: StudyStatus,
    pub max_participants: u32,
    pub consent_document: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StudyUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<StudyStatus>,
    pub updated_at: DateTime<Utc>,
}
