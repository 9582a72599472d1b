//! A stand-in for the Bank ID service: every order completes as the same test person once
//! it is old enough.

use super::BankIdProvider;
use crate::clients::OrderClient;
use crate::clock::{elapsed_between, Clock};
use crate::error::AuthError;
use crate::model::{
    BankIdOrderCreate, HintCode, Identity, InitiatedOrder, OrderRef, StatusObservation,
    SubjectId,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_COMPLETION_AFTER: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct StatusSimulator {
    orders: OrderClient,
    clock: Arc<dyn Clock>,
    completion_after: Duration,
    identity: Identity,
}

impl StatusSimulator {
    pub fn new(orders: OrderClient, clock: Arc<dyn Clock>, completion_after: Duration) -> Self {
        Self {
            orders,
            clock,
            completion_after,
            identity: Identity::synthetic(),
        }
    }

    /// Completes orders as `identity` instead of the default test person.
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }
}

#[async_trait]
impl BankIdProvider for StatusSimulator {
    #[instrument(skip(self))]
    async fn initiate(&self, subject_id: &str) -> Result<InitiatedOrder, AuthError> {
        let subject_id = SubjectId::parse(subject_id)?;
        let params = BankIdOrderCreate::issue(subject_id, self.clock.now());

        let reference = self
            .orders
            .register(params.clone())
            .await
            .map_err(AuthError::backend)?;
        info!(%reference, "Order initiated");

        Ok(InitiatedOrder {
            reference,
            created_at: params.created_at,
            auto_start_token: params.auto_start_token,
            qr_start_token: params.qr_start_token,
            qr_start_secret: params.qr_start_secret,
        })
    }

    #[instrument(skip(self, reference), fields(%reference))]
    async fn observe(&self, reference: &OrderRef) -> Result<StatusObservation, AuthError> {
        if !reference.is_well_formed() {
            debug!("Reference outside naming scheme");
            return Ok(StatusObservation::failed(HintCode::UserCancel));
        }

        let Some(order) = self
            .orders
            .lookup(reference)
            .await
            .map_err(AuthError::backend)?
        else {
            debug!("Unknown order");
            return Ok(StatusObservation::failed(HintCode::UserCancel));
        };

        let elapsed = elapsed_between(order.created_at, self.clock.now());
        if elapsed < self.completion_after {
            Ok(StatusObservation::pending(HintCode::OutstandingTransaction))
        } else {
            Ok(StatusObservation::complete(self.identity.clone()))
        }
    }

    #[instrument(skip(self, reference), fields(%reference))]
    async fn discard(&self, reference: &OrderRef) {
        match self.orders.discard(reference).await {
            Ok(true) => debug!("Order discarded"),
            Ok(false) => debug!("Order already gone"),
            Err(e) => warn!(error = %e, "Could not discard order"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::Status;
    use chrono::Utc;
    use portal_framework::ActorClient;

    fn simulator() -> (StatusSimulator, OrderClient, Arc<ManualClock>) {
        let (actor, orders) = crate::order_actor::new(8);
        tokio::spawn(actor.run(()));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let simulator =
            StatusSimulator::new(orders.clone(), clock.clone(), DEFAULT_COMPLETION_AFTER);
        (simulator, orders, clock)
    }

    #[tokio::test]
    async fn test_malformed_subject_creates_no_order() {
        let (simulator, orders, _clock) = simulator();

        for raw in [
            "not-a-number",
            "",
            "19781012_6789",
            "1978-10-12-6789",
            "١٩٧٨١٠١٢-٦٧٨٩",
        ] {
            let err = simulator.initiate(raw).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation { .. }));
        }
        assert!(orders.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_order_is_pending() {
        let (simulator, _orders, _clock) = simulator();

        let order = simulator.initiate("19781012-6789").await.unwrap();
        assert!(order.reference.as_str().starts_with("bankid-order-"));
        assert!(!order.auto_start_token.is_empty());

        let observation = simulator.observe(&order.reference).await.unwrap();
        assert_eq!(observation.status, Status::Pending);
        assert_eq!(observation.hint_code, Some(HintCode::OutstandingTransaction));
        assert!(observation.identity.is_none());
    }

    #[tokio::test]
    async fn test_order_completes_at_threshold_and_stays_complete() {
        let (simulator, _orders, clock) = simulator();
        let order = simulator.initiate("19781012-6789").await.unwrap();

        clock.advance(Duration::from_millis(2999));
        assert_eq!(
            simulator.observe(&order.reference).await.unwrap().status,
            Status::Pending
        );

        clock.advance(Duration::from_millis(1));
        let first = simulator.observe(&order.reference).await.unwrap();
        let second = simulator.observe(&order.reference).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, StatusObservation::complete(Identity::synthetic()));

        let identity = first.identity.unwrap();
        assert_eq!(identity.external_id, "197810126789");
        assert_eq!(identity.display_name, "Erik Svensson");
        assert_eq!(identity.ip_address, "192.168.1.100");
    }

    #[tokio::test]
    async fn test_foreign_references_fail_with_user_cancel() {
        let (simulator, _orders, _clock) = simulator();

        for raw in [
            "anything",
            "",
            "bankid-order-",
            "bankid-order-00000000-0000-4000-8000-000000000000",
        ] {
            let observation = simulator.observe(&OrderRef::new(raw)).await.unwrap();
            assert_eq!(observation, StatusObservation::failed(HintCode::UserCancel));
        }
    }

    #[tokio::test]
    async fn test_discarded_order_reads_as_failed() {
        let (simulator, orders, _clock) = simulator();
        let order = simulator.initiate("19781012-6789").await.unwrap();

        simulator.discard(&order.reference).await;
        simulator.discard(&order.reference).await;

        assert!(orders.lookup(&order.reference).await.unwrap().is_none());
        assert_eq!(
            simulator.observe(&order.reference).await.unwrap().status,
            Status::Failed
        );
    }

    #[tokio::test]
    async fn test_closed_registry_is_a_backend_error() {
        let (actor, orders) = crate::order_actor::new(8);
        drop(actor);
        let simulator = StatusSimulator::new(
            orders,
            Arc::new(ManualClock::new(Utc::now())),
            DEFAULT_COMPLETION_AFTER,
        );

        let err = simulator.initiate("19781012-6789").await.unwrap_err();
        assert!(matches!(err, AuthError::Backend { .. }));
    }
}
