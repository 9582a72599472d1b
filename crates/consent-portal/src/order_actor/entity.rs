//! [`ActorEntity`] implementation for [`BankIdOrder`].

use super::error::OrderError;
use crate::model::{BankIdOrder, BankIdOrderCreate, OrderRef};
use async_trait::async_trait;
use portal_framework::ActorEntity;
use std::convert::Infallible;

#[async_trait]
impl ActorEntity for BankIdOrder {
    type Id = OrderRef;
    type Create = BankIdOrderCreate;
    type Update = Infallible;
    type Action = Infallible;
    type ActionResult = ();
    type Context = ();
    type Error = OrderError;

    fn from_create_params(reference: OrderRef, params: BankIdOrderCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            reference,
            subject_id: params.subject_id,
            created_at: params.created_at,
            auto_start_token: params.auto_start_token,
            qr_start_token: params.qr_start_token,
            qr_start_secret: params.qr_start_secret,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.reference.to_string())
    }

    async fn on_update(&mut self, update: Infallible, _ctx: &()) -> Result<(), Self::Error> {
        match update {}
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), Self::Error> {
        match action {}
    }
}
