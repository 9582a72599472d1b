use crate::model::{Study, StudyCreate, StudyId, StudyStatus, StudyUpdate};
use crate::study_actor::{Capacity, StudyAction, StudyActionResult, StudyError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_framework::{ActorClient, Filter, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

/// Client for interacting with the Study actor.
#[derive(Clone)]
pub struct StudyClient {
    inner: ResourceClient<Study>,
}

impl StudyClient {
    pub fn new(inner: ResourceClient<Study>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Study> for StudyClient {
    type Error = StudyError;

    fn inner(&self) -> &ResourceClient<Study> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => StudyError::NotFound(id),
            other => other
                .entity_error::<StudyError>()
                .cloned()
                .unwrap_or_else(|| StudyError::ActorCommunicationError(other.to_string())),
        }
    }
}

impl StudyClient {
    #[instrument(skip(self))]
    pub async fn create_study(&self, params: StudyCreate) -> Result<StudyId, StudyError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Active studies, oldest first.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<Study>, StudyError> {
        debug!("Sending request");
        let mut studies = self
            .inner
            .list(Filter::new(|study: &Study| study.status == StudyStatus::Active))
            .await
            .map_err(Self::map_error)?;
        studies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(studies)
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: StudyId,
        status: StudyStatus,
        at: DateTime<Utc>,
    ) -> Result<Study, StudyError> {
        debug!("Sending request");
        let update = StudyUpdate {
            title: None,
            description: None,
            status: Some(status),
            updated_at: at,
        };
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Takes one slot; returns the slots left.
    #[instrument(skip(self))]
    pub async fn enroll(&self, id: StudyId) -> Result<u32, StudyError> {
        debug!("Sending request");
        match self.action(id, StudyAction::Enroll).await? {
            StudyActionResult::Enroll(remaining) => Ok(remaining),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn release(&self, id: StudyId) -> Result<u32, StudyError> {
        debug!("Sending request");
        match self.action(id, StudyAction::Release).await? {
            StudyActionResult::Release(remaining) => Ok(remaining),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn capacity(&self, id: StudyId) -> Result<Capacity, StudyError> {
        debug!("Sending request");
        match self.action(id, StudyAction::CheckCapacity).await? {
            StudyActionResult::CheckCapacity(capacity) => Ok(capacity),
            other => Err(unexpected(other)),
        }
    }

    async fn action(&self, id: StudyId, action: StudyAction) -> Result<StudyActionResult, StudyError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

fn unexpected(result: StudyActionResult) -> StudyError {
    StudyError::ActorCommunicationError(format!("Unexpected action result: {result:?}"))
}
