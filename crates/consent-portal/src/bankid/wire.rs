//! # Wire Endpoints
//!
//! The JSON contract of the two Bank ID functions, as plain async handlers over a
//! [`BankIdProvider`]. Transport is left to the caller: a handler takes the method, path
//! and body of a request and returns a status code and a JSON body.
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `POST /bankid-auth` | `{orderRef, autoStartToken, qrStartToken, qrStartSecret}` | 400 `BANKID_INITIATE_ERROR` |
//! | `GET /bankid-status/<orderRef>` | `{status, hintCode?, completionData?}` | 400 `BANKID_STATUS_ERROR` |

use super::BankIdProvider;
use crate::model::{HintCode, Identity, InitiatedOrder, OrderRef, Status, StatusObservation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

pub const INITIATE_PATH: &str = "/bankid-auth";
pub const STATUS_PATH: &str = "/bankid-status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Options,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
    pub status: u16,
    pub body: Value,
}

impl WireResponse {
    fn ok(body: impl Serialize) -> Self {
        Self::json(200, body)
    }

    fn error(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::json(
            400,
            ErrorBody {
                error: message.into(),
                code,
            },
        )
    }

    fn json(status: u16, body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status, body },
            Err(e) => Self {
                status: 500,
                body: serde_json::json!({ "error": e.to_string() }),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BankidInitiateError,
    BankidStatusError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: ErrorCode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRequest {
    pub personal_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    pub order_ref: OrderRef,
    pub auto_start_token: String,
    pub qr_start_token: String,
    pub qr_start_secret: String,
}

impl From<InitiatedOrder> for InitiateResponse {
    fn from(order: InitiatedOrder) -> Self {
        Self {
            order_ref: order.reference,
            auto_start_token: order.auto_start_token,
            qr_start_token: order.qr_start_token,
            qr_start_secret: order.qr_start_secret,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_code: Option<HintCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_data: Option<CompletionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionData {
    pub user: CompletionUser,
    pub device: Device,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionUser {
    pub personal_number: String,
    pub name: String,
    pub given_name: String,
    pub surname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub ip_address: String,
}

impl From<Identity> for CompletionData {
    fn from(identity: Identity) -> Self {
        Self {
            user: CompletionUser {
                personal_number: identity.external_id,
                name: identity.display_name,
                given_name: identity.given_name,
                surname: identity.surname,
            },
            device: Device {
                ip_address: identity.ip_address,
            },
        }
    }
}

impl From<StatusObservation> for StatusResponse {
    fn from(observation: StatusObservation) -> Self {
        Self {
            status: observation.status,
            hint_code: observation.hint_code,
            completion_data: observation.identity.map(CompletionData::from),
        }
    }
}

/// `POST /bankid-auth` with `{ "personalNumber": "YYYYMMDD-NNNN" }`.
pub async fn handle_initiate(provider: &dyn BankIdProvider, method: Method, body: &str) -> WireResponse {
    if method != Method::Post {
        return WireResponse::error("Method not allowed", ErrorCode::BankidInitiateError);
    }

    let request: InitiateRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Malformed initiate body");
            return WireResponse::error(
                format!("Invalid request body: {e}"),
                ErrorCode::BankidInitiateError,
            );
        }
    };

    match provider.initiate(&request.personal_number).await {
        Ok(order) => {
            info!(reference = %order.reference, "Initiate handled");
            WireResponse::ok(InitiateResponse::from(order))
        }
        Err(e) => {
            warn!(kind = ?e.kind(), error = %e, "Initiate rejected");
            WireResponse::error(e.to_string(), ErrorCode::BankidInitiateError)
        }
    }
}

/// `GET /bankid-status/<orderRef>`. The reference is the last path segment.
pub async fn handle_status(provider: &dyn BankIdProvider, method: Method, path: &str) -> WireResponse {
    if method != Method::Get {
        return WireResponse::error("Method not allowed", ErrorCode::BankidStatusError);
    }

    let reference = match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => OrderRef::new(segment),
        _ => return WireResponse::error("Order reference is required", ErrorCode::BankidStatusError),
    };

    match provider.observe(&reference).await {
        Ok(observation) => WireResponse::ok(StatusResponse::from(observation)),
        Err(e) => {
            warn!(%reference, error = %e, "Status check failed");
            WireResponse::error(e.to_string(), ErrorCode::BankidStatusError)
        }
    }
}

/// Dispatches a request to one of the two handlers by path.
pub async fn route(
    provider: &dyn BankIdProvider,
    method: Method,
    path: &str,
    body: &str,
) -> WireResponse {
    if method == Method::Options {
        return WireResponse::ok("ok");
    }
    if path == INITIATE_PATH {
        handle_initiate(provider, method, body).await
    } else if path == STATUS_PATH || path.starts_with(&format!("{STATUS_PATH}/")) {
        handle_status(provider, method, path).await
    } else {
        WireResponse::json(404, serde_json::json!({ "error": "Not found" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bankid::simulator::{StatusSimulator, DEFAULT_COMPLETION_AFTER};
    use crate::clock::ManualClock;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn simulator() -> (StatusSimulator, Arc<ManualClock>) {
        let (actor, orders) = crate::order_actor::new(8);
        tokio::spawn(actor.run(()));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (
            StatusSimulator::new(orders, clock.clone(), DEFAULT_COMPLETION_AFTER),
            clock,
        )
    }

    #[tokio::test]
    async fn test_initiate_then_status_round() {
        let (simulator, clock) = simulator();

        let response = route(
            &simulator,
            Method::Post,
            INITIATE_PATH,
            r#"{"personalNumber":"19781012-6789"}"#,
        )
        .await;
        assert_eq!(response.status, 200);
        let initiated: InitiateResponse = serde_json::from_value(response.body).unwrap();
        assert!(initiated.order_ref.is_well_formed());

        let path = format!("{STATUS_PATH}/{}", initiated.order_ref);
        let pending = route(&simulator, Method::Get, &path, "").await;
        assert_eq!(
            pending.body,
            json!({ "status": "pending", "hintCode": "outstandingTransaction" })
        );

        clock.advance(Duration::from_secs(3));
        let complete = route(&simulator, Method::Get, &path, "").await;
        assert_eq!(complete.status, 200);
        assert_eq!(
            complete.body,
            json!({
                "status": "complete",
                "completionData": {
                    "user": {
                        "personalNumber": "197810126789",
                        "name": "Erik Svensson",
                        "givenName": "Erik",
                        "surname": "Svensson"
                    },
                    "device": { "ipAddress": "192.168.1.100" }
                }
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_personal_number_is_initiate_error() {
        let (simulator, _clock) = simulator();

        let response = handle_initiate(
            &simulator,
            Method::Post,
            r#"{"personalNumber":"not-a-number"}"#,
        )
        .await;
        assert_eq!(response.status, 400);
        assert_eq!(response.body["code"], "BANKID_INITIATE_ERROR");
        assert!(response.body["error"]
            .as_str()
            .unwrap()
            .contains("Invalid personal number format"));
    }

    #[tokio::test]
    async fn test_malformed_body_and_wrong_method() {
        let (simulator, _clock) = simulator();

        let bad_body = handle_initiate(&simulator, Method::Post, "{").await;
        assert_eq!(bad_body.status, 400);

        let wrong_method = handle_initiate(&simulator, Method::Get, "").await;
        assert_eq!(wrong_method.body["error"], "Method not allowed");

        let status_post = handle_status(&simulator, Method::Post, "/bankid-status/x").await;
        assert_eq!(status_post.body["code"], "BANKID_STATUS_ERROR");
    }

    #[tokio::test]
    async fn test_status_without_reference_and_foreign_reference() {
        let (simulator, _clock) = simulator();

        let missing = handle_status(&simulator, Method::Get, "/bankid-status/").await;
        assert_eq!(missing.status, 400);
        assert_eq!(missing.body["error"], "Order reference is required");

        let foreign = handle_status(&simulator, Method::Get, "/bankid-status/order-1").await;
        assert_eq!(foreign.status, 200);
        assert_eq!(foreign.body, json!({ "status": "failed", "hintCode": "userCancel" }));
    }

    #[tokio::test]
    async fn test_unknown_route_and_preflight() {
        let (simulator, _clock) = simulator();

        assert_eq!(route(&simulator, Method::Get, "/nope", "").await.status, 404);
        assert_eq!(
            route(&simulator, Method::Options, "/bankid-auth", "").await.status,
            200
        );
    }
}
