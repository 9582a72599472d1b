//! # Order Registry
//!
//! Live Bank ID orders keyed by their reference. The creation time is stored with the
//! order; the simulator reads it back to decide whether an order has completed.
//! Orders are immutable and are removed once their poll resolves.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::model::{BankIdOrder, OrderRef};
use portal_framework::ResourceActor;

/// Creates a new order registry actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<BankIdOrder>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, OrderRef::generate);
    (actor, OrderClient::new(generic_client))
}
