//! [`ActorEntity`] implementation for [`User`].

use super::error::UserError;
use crate::model::{User, UserCreate, UserId, UserUpdate};
use async_trait::async_trait;
use portal_framework::ActorEntity;

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = UserError;

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, Self::Error> {
        if params.external_id.trim().is_empty() {
            return Err(UserError::ValidationError(
                "external id must not be empty".to_string(),
            ));
        }
        if params.display_name.trim().is_empty() {
            return Err(UserError::ValidationError(
                "display name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id,
            email: User::synthetic_email(&params.external_id),
            external_id: params.external_id,
            display_name: params.display_name,
            role: params.role,
            verified: params.verified,
            last_auth_at: params.authenticated_at,
            created_at: params.created_at,
            updated_at: params.created_at,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.external_id.clone())
    }

    /// Last write wins for every field present in the update.
    async fn on_update(&mut self, update: UserUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(display_name) = update.display_name {
            if display_name.trim().is_empty() {
                return Err(UserError::ValidationError(
                    "display name must not be empty".to_string(),
                ));
            }
            self.display_name = display_name;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(verified) = update.verified {
            self.verified = verified;
        }
        if let Some(at) = update.authenticated_at {
            self.last_auth_at = Some(at);
        }
        self.updated_at = update.updated_at;
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }
}
