//! [`ActorEntity`] implementation for [`Study`], including the enrollment actions.

use super::actions::{Capacity, StudyAction, StudyActionResult};
use super::error::StudyError;
use crate::model::{Study, StudyCreate, StudyId, StudyStatus, StudyUpdate};
use async_trait::async_trait;
use portal_framework::ActorEntity;

#[async_trait]
impl ActorEntity for Study {
    type Id = StudyId;
    type Create = StudyCreate;
    type Update = StudyUpdate;
    type Action = StudyAction;
    type ActionResult = StudyActionResult;
    type Context = ();
    type Error = StudyError;

    fn from_create_params(id: StudyId, params: StudyCreate) -> Result<Self, Self::Error> {
        if params.title.trim().is_empty() {
            return Err(StudyError::ValidationError(
                "title must not be empty".to_string(),
            ));
        }
        if params.max_participants == 0 {
            return Err(StudyError::ValidationError(
                "max participants must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            id,
            title: params.title,
            description: params.description,
            status: params.status,
            max_participants: params.max_participants,
            enrolled: 0,
            consent_document: params.consent_document,
            created_at: params.created_at,
            updated_at: params.created_at,
        })
    }

    async fn on_update(&mut self, update: StudyUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(StudyError::ValidationError(
                    "title must not be empty".to_string(),
                ));
            }
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = update.updated_at;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: StudyAction,
        _ctx: &(),
    ) -> Result<StudyActionResult, Self::Error> {
        match action {
            StudyAction::CheckCapacity => Ok(StudyActionResult::CheckCapacity(Capacity {
                enrolled: self.enrolled,
                max_participants: self.max_participants,
            })),
            StudyAction::Enroll => {
                if self.status != StudyStatus::Active {
                    return Err(StudyError::NotRecruiting(self.id.to_string()));
                }
                if self.enrolled >= self.max_participants {
                    return Err(StudyError::StudyFull {
                        enrolled: self.enrolled,
                        max_participants: self.max_participants,
                    });
                }
                self.enrolled += 1;
                Ok(StudyActionResult::Enroll(self.remaining_slots()))
            }
            StudyAction::Release => {
                self.enrolled = self.enrolled.saturating_sub(1);
                Ok(StudyActionResult::Release(self.remaining_slots()))
            }
        }
    }
}
