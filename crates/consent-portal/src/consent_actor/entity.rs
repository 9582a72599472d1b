//! [`ActorEntity`] implementation for [`ConsentRecord`].
//!
//! `on_create` is where the cross-actor checks happen: the user and the study are read
//! through the injected clients, and a given consent enrolls the participant.

use super::actions::ConsentAction;
use super::error::ConsentError;
use crate::clients::{StudyClient, UserClient};
use crate::model::{ConsentCreate, ConsentId, ConsentRecord, StudyStatus};
use async_trait::async_trait;
use portal_framework::ActorClient;
use portal_framework::ActorEntity;
use tracing::{info, warn};

/// Key held by a record while it is active, so a participant answers a study once.
fn answer_key(record: &ConsentRecord) -> String {
    format!("{}:{}", record.user_id, record.study_id)
}

#[async_trait]
impl ActorEntity for ConsentRecord {
    type Id = ConsentId;
    type Create = ConsentCreate;
    type Update = ();
    type Action = ConsentAction;
    type ActionResult = ConsentRecord;
    type Context = (UserClient, StudyClient);
    type Error = ConsentError;

    fn from_create_params(id: ConsentId, params: ConsentCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            user_id: params.user_id,
            study_id: params.study_id,
            consent_given: params.consent_given,
            transaction_id: params.transaction_id,
            given_at: params.given_at,
            withdrawn_at: None,
            withdrawal_reason: None,
        })
    }

    fn unique_key(&self) -> Option<String> {
        self.is_active().then(|| answer_key(self))
    }

    async fn on_create(&mut self, ctx: &Self::Context) -> Result<(), Self::Error> {
        let (users, studies) = ctx;

        let user = users
            .get(self.user_id.clone())
            .await
            .map_err(|e| ConsentError::InvalidUser(e.to_string()))?
            .ok_or_else(|| ConsentError::InvalidUser(self.user_id.to_string()))?;
        if !user.verified {
            return Err(ConsentError::UnverifiedUser(user.id.to_string()));
        }

        let study = studies
            .get(self.study_id.clone())
            .await
            .map_err(|e| ConsentError::InvalidStudy(e.to_string()))?
            .ok_or_else(|| ConsentError::InvalidStudy(self.study_id.to_string()))?;
        if study.status != StudyStatus::Active {
            return Err(ConsentError::StudyNotRecruiting(study.id.to_string()));
        }

        if self.consent_given {
            let remaining = studies
                .enroll(study.id.clone())
                .await
                .map_err(|e| ConsentError::EnrollmentFailed(e.to_string()))?;
            info!(study_id = %study.id, remaining, "Participant enrolled");
        }
        Ok(())
    }

    /// Records are append-only; the only change is a withdrawal.
    async fn on_update(&mut self, _update: (), _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ConsentAction,
        ctx: &Self::Context,
    ) -> Result<ConsentRecord, Self::Error> {
        match action {
            ConsentAction::Withdraw { reason, at } => {
                if self.withdrawn_at.is_some() {
                    return Err(ConsentError::AlreadyWithdrawn(self.id.to_string()));
                }
                if !self.consent_given {
                    return Err(ConsentError::NotGiven(self.id.to_string()));
                }

                let (_, studies) = ctx;
                if let Err(e) = studies.release(self.study_id.clone()).await {
                    warn!(study_id = %self.study_id, error = %e, "Could not release study slot");
                    return Err(ConsentError::ReleaseFailed(e.to_string()));
                }

                self.withdrawn_at = Some(at);
                self.withdrawal_reason = reason;
                Ok(self.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{StudyClient, UserClient};
    use crate::model::{ConsentId, StudyId, UserId};
    use chrono::Utc;
    use portal_framework::mock::MockClient;
    use portal_framework::FrameworkError;

    fn given_record() -> ConsentRecord {
        ConsentRecord {
            id: ConsentId::new("consent_1"),
            user_id: UserId::new("user_1"),
            study_id: StudyId::new("study_1"),
            consent_given: true,
            transaction_id: "consent-tx-1".to_string(),
            given_at: Utc::now(),
            withdrawn_at: None,
            withdrawal_reason: None,
        }
    }

    #[tokio::test]
    async fn test_failed_release_keeps_consent_active() {
        let users = MockClient::new();
        let mut studies = MockClient::new();
        studies.expect_action().return_err(FrameworkError::ActorClosed);
        let ctx = (UserClient::new(users.client()), StudyClient::new(studies.client()));

        let mut record = given_record();
        let result = record
            .handle_action(
                ConsentAction::Withdraw {
                    reason: Some("No time".to_string()),
                    at: Utc::now(),
                },
                &ctx,
            )
            .await;

        assert!(matches!(result, Err(ConsentError::ReleaseFailed(_))));
        assert!(record.is_active());
        assert!(record.withdrawal_reason.is_none());
        studies.verify();
    }

    #[test]
    fn test_only_active_records_hold_the_answer_key() {
        let mut record = given_record();
        assert_eq!(record.unique_key().as_deref(), Some("user_1:study_1"));

        record.withdrawn_at = Some(Utc::now());
        assert_eq!(record.unique_key(), None);

        let declined = ConsentRecord {
            consent_given: false,
            ..given_record()
        };
        assert_eq!(declined.unique_key(), None);
    }
}
