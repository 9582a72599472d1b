use crate::consent_actor::{ConsentAction, ConsentError};
use crate::model::{ConsentCreate, ConsentId, ConsentRecord, StudyId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_framework::{ActorClient, Filter, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

/// Client for interacting with the Consent actor.
#[derive(Clone)]
pub struct ConsentClient {
    inner: ResourceClient<ConsentRecord>,
}

impl ConsentClient {
    pub fn new(inner: ResourceClient<ConsentRecord>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<ConsentRecord> for ConsentClient {
    type Error = ConsentError;

    fn inner(&self) -> &ResourceClient<ConsentRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => ConsentError::NotFound(id),
            FrameworkError::Conflict(key) => ConsentError::AlreadyAnswered(key),
            other => other
                .entity_error::<ConsentError>()
                .cloned()
                .unwrap_or_else(|| ConsentError::ActorCommunicationError(other.to_string())),
        }
    }
}

impl ConsentClient {
    /// Records an answer and returns the stored record.
    #[instrument(skip(self))]
    pub async fn submit_consent(&self, params: ConsentCreate) -> Result<ConsentRecord, ConsentError> {
        debug!("Sending request");
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        self.get(id.clone())
            .await?
            .ok_or_else(|| ConsentError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn withdraw_consent(
        &self,
        id: ConsentId,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<ConsentRecord, ConsentError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, ConsentAction::Withdraw { reason, at })
            .await
            .map_err(Self::map_error)
    }

    /// The most recent answer the user gave for the study, withdrawn or not.
    #[instrument(skip(self))]
    pub async fn latest_for(
        &self,
        user_id: &UserId,
        study_id: &StudyId,
    ) -> Result<Option<ConsentRecord>, ConsentError> {
        debug!("Sending request");
        let (user_id, study_id) = (user_id.clone(), study_id.clone());
        let records = self
            .inner
            .list(Filter::new(move |record: &ConsentRecord| {
                record.user_id == user_id && record.study_id == study_id
            }))
            .await
            .map_err(Self::map_error)?;
        Ok(records.into_iter().max_by_key(|record| record.given_at))
    }

    /// Every record of the user, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<ConsentRecord>, ConsentError> {
        debug!("Sending request");
        let user_id = user_id.clone();
        let mut records = self
            .inner
            .list(Filter::new(move |record: &ConsentRecord| record.user_id == user_id))
            .await
            .map_err(Self::map_error)?;
        records.sort_by(|a, b| b.given_at.cmp(&a.given_at));
        Ok(records)
    }
}
