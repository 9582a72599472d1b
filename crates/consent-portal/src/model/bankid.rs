use crate::error::AuthError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

/// Every reference handed out by the simulator starts with this.
pub const ORDER_REF_PREFIX: &str = "bankid-order-";

static SUBJECT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8}-[0-9]{4}$").expect("subject id pattern is valid"));

/// A personal number in `YYYYMMDD-NNNN` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        if SUBJECT_ID_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(AuthError::Validation {
                input: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference correlating one login attempt with its status checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRef(String);

impl OrderRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn generate() -> Self {
        Self(format!("{ORDER_REF_PREFIX}{}", Uuid::new_v4()))
    }

    /// Whether the reference follows the simulator's naming scheme. Says nothing about
    /// whether the order still exists.
    pub fn is_well_formed(&self) -> bool {
        self.0
            .strip_prefix(ORDER_REF_PREFIX)
            .is_some_and(|rest| !rest.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A live Bank ID order, held by the order registry until the poll resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct BankIdOrder {
    pub reference: OrderRef,
    pub subject_id: SubjectId,
    pub created_at: DateTime<Utc>,
    pub auto_start_token: String,
    pub qr_start_token: String,
    pub qr_start_secret: String,
}

#[derive(Debug, Clone)]
pub struct BankIdOrderCreate {
    pub subject_id: SubjectId,
    pub created_at: DateTime<Utc>,
    pub auto_start_token: String,
    pub qr_start_token: String,
    pub qr_start_secret: String,
}

impl BankIdOrderCreate {
    /// Fresh random start tokens for `subject_id`.
    pub fn issue(subject_id: SubjectId, created_at: DateTime<Utc>) -> Self {
        Self {
            subject_id,
            created_at,
            auto_start_token: Uuid::new_v4().to_string(),
            qr_start_token: Uuid::new_v4().to_string(),
            qr_start_secret: Uuid::new_v4().to_string(),
        }
    }
}

/// What `initiate` hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct InitiatedOrder {
    pub reference: OrderRef,
    pub created_at: DateTime<Utc>,
    pub auto_start_token: String,
    pub qr_start_token: String,
    pub qr_start_secret: String,
}

impl From<BankIdOrder> for InitiatedOrder {
    fn from(order: BankIdOrder) -> Self {
        Self {
            reference: order.reference,
            created_at: order.created_at,
            auto_start_token: order.auto_start_token,
            qr_start_token: order.qr_start_token,
            qr_start_secret: order.qr_start_secret,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Complete,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Pending => "pending",
            Status::Complete => "complete",
            Status::Failed => "failed",
        })
    }
}

/// Provider reason code attached to pending and failed observations.
///
/// Codes the portal does not know are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HintCode {
    OutstandingTransaction,
    NoClient,
    Started,
    UserSign,
    UserCancel,
    ExpiredTransaction,
    CertificateErr,
    StartFailed,
    Other(String),
}

impl HintCode {
    pub fn as_str(&self) -> &str {
        match self {
            HintCode::OutstandingTransaction => "outstandingTransaction",
            HintCode::NoClient => "noClient",
            HintCode::Started => "started",
            HintCode::UserSign => "userSign",
            HintCode::UserCancel => "userCancel",
            HintCode::ExpiredTransaction => "expiredTransaction",
            HintCode::CertificateErr => "certificateErr",
            HintCode::StartFailed => "startFailed",
            HintCode::Other(code) => code,
        }
    }
}

impl From<String> for HintCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "outstandingTransaction" => HintCode::OutstandingTransaction,
            "noClient" => HintCode::NoClient,
            "started" => HintCode::Started,
            "userSign" => HintCode::UserSign,
            "userCancel" => HintCode::UserCancel,
            "expiredTransaction" => HintCode::ExpiredTransaction,
            "certificateErr" => HintCode::CertificateErr,
            "startFailed" => HintCode::StartFailed,
            _ => HintCode::Other(code),
        }
    }
}

impl From<HintCode> for String {
    fn from(code: HintCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for HintCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The completion payload: who signed, and from which device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub external_id: String,
    pub display_name: String,
    pub given_name: String,
    pub surname: String,
    pub ip_address: String,
}

impl Identity {
    /// The fixed test person every simulated order completes as.
    pub fn synthetic() -> Self {
        Self {
            external_id: "197810126789".to_string(),
            display_name: "Erik Svensson".to_string(),
            given_name: "Erik".to_string(),
            surname: "Svensson".to_string(),
            ip_address: "192.168.1.100".to_string(),
        }
    }
}

/// One answer from `observe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusObservation {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_code: Option<HintCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
}

impl StatusObservation {
    pub fn pending(hint_code: HintCode) -> Self {
        Self {
            status: Status::Pending,
            hint_code: Some(hint_code),
            identity: None,
        }
    }

    pub fn complete(identity: Identity) -> Self {
        Self {
            status: Status::Complete,
            hint_code: None,
            identity: Some(identity),
        }
    }

    pub fn failed(hint_code: HintCode) -> Self {
        Self {
            status: Status::Failed,
            hint_code: Some(hint_code),
            identity: None,
        }
    }
}
