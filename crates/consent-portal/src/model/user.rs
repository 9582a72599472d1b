use super::bankid::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Domain used for addresses synthesized from a Bank ID login.
pub const SYNTHETIC_EMAIL_DOMAIN: &str = "bankid.test";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn generate() -> Self {
        Self(format!("user_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Participant,
    Researcher,
    Administrator,
}

/// A portal account, keyed externally by the verified personal number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub external_id: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub verified: bool,
    pub last_auth_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn synthetic_email(external_id: &str) -> String {
        format!("{external_id}@{SYNTHETIC_EMAIL_DOMAIN}")
    }
}

#[derive(Debug, Clone)]
pub struct UserCreate {
    pub external_id: String,
    pub display_name: String,
    pub role: Role,
    pub verified: bool,
    pub authenticated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserCreate {
    /// A verified participant built from a completed Bank ID login.
    pub fn from_identity(identity: &Identity, now: DateTime<Utc>) -> Self {
        Self {
            external_id: identity.external_id.clone(),
            display_name: identity.display_name.clone(),
            role: Role::Participant,
            verified: true,
            authenticated_at: Some(now),
            created_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub verified: Option<bool>,
    pub authenticated_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl UserUpdate {
    /// Refreshes name, verification and last login time after a Bank ID login.
    pub fn from_identity(identity: &Identity, now: DateTime<Utc>) -> Self {
        Self {
            display_name: Some(identity.display_name.clone()),
            role: None,
            verified: Some(true),
            authenticated_at: Some(now),
            updated_at: now,
        }
    }
}
