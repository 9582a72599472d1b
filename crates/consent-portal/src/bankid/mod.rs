//! # Bank ID
//!
//! The provider seam and everything built on it:
//!
//! - [`BankIdProvider`] - `initiate` / `observe` / `discard`, implemented by the
//!   [`simulator::StatusSimulator`] and by test fakes.
//! - [`poller::Poller`] - bounded, cancellable polling of one order.
//! - [`wire`] - the JSON request/response shapes of the two endpoints.

pub mod poller;
pub mod simulator;
pub mod wire;

pub use poller::{CancelHandle, CancelToken, PollConfig, Poller};
pub use simulator::StatusSimulator;

use crate::error::AuthError;
use crate::model::{InitiatedOrder, OrderRef, StatusObservation};
use async_trait::async_trait;

#[async_trait]
pub trait BankIdProvider: Send + Sync {
    /// Starts an order for `subject_id`. Fails with [`AuthError::Validation`] for a
    /// malformed personal number, in which case no order exists afterwards.
    async fn initiate(&self, subject_id: &str) -> Result<InitiatedOrder, AuthError>;

    /// Reads the current status of an order. Must not change any state.
    async fn observe(&self, reference: &OrderRef) -> Result<StatusObservation, AuthError>;

    /// Forgets the order. Unknown references are ignored.
    async fn discard(&self, reference: &OrderRef);
}
