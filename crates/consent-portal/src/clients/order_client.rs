use crate::model::{BankIdOrder, BankIdOrderCreate, OrderRef};
use crate::order_actor::OrderError;
use async_trait::async_trait;
use portal_framework::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

/// Client for the Bank ID order registry.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<BankIdOrder>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<BankIdOrder>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<BankIdOrder> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<BankIdOrder> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::Conflict(reference) => OrderError::DuplicateReference(reference),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl OrderClient {
    #[instrument(skip(self))]
    pub async fn register(&self, params: BankIdOrderCreate) -> Result<OrderRef, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    pub async fn lookup(&self, reference: &OrderRef) -> Result<Option<BankIdOrder>, OrderError> {
        self.get(reference.clone()).await
    }

    /// Removes the order. Returns `false` if it was already gone.
    #[instrument(skip(self, reference), fields(%reference))]
    pub async fn discard(&self, reference: &OrderRef) -> Result<bool, OrderError> {
        debug!("Sending request");
        match self.inner.delete(reference.clone()).await {
            Ok(()) => Ok(true),
            Err(FrameworkError::NotFound(_)) => Ok(false),
            Err(e) => Err(Self::map_error(e)),
        }
    }
}
