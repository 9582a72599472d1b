use crate::model::{User, UserCreate, UserId, UserUpdate};
use crate::user_actor::UserError;
use async_trait::async_trait;
use portal_framework::{ActorClient, Filter, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<User> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &ResourceClient<User> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::Conflict(key) => UserError::AlreadyExists(key),
            FrameworkError::NotFound(id) => UserError::NotFound(id),
            other => other
                .entity_error::<UserError>()
                .cloned()
                .unwrap_or_else(|| UserError::ActorCommunicationError(other.to_string())),
        }
    }
}

impl UserClient {
    /// Fails with [`UserError::AlreadyExists`] if the personal number is taken.
    #[instrument(skip(self))]
    pub async fn create_user(&self, params: UserCreate) -> Result<UserId, UserError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, UserError> {
        debug!("Sending request");
        let external_id = external_id.to_string();
        self.inner
            .find(Filter::new(move |user: &User| user.external_id == external_id))
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Identity, Role};
    use chrono::Utc;
    use portal_framework::mock::MockClient;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new("user_1"),
            external_id: "197810126789".to_string(),
            display_name: "Erik Svensson".to_string(),
            email: User::synthetic_email("197810126789"),
            role: Role::Participant,
            verified: true,
            last_auth_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_conflict_maps_to_already_exists() {
        let (actor, client) = crate::user_actor::new(8);
        tokio::spawn(actor.run(()));

        let params = UserCreate::from_identity(&Identity::synthetic(), Utc::now());
        client.create_user(params.clone()).await.unwrap();

        let second = client.create_user(params).await;
        assert_eq!(
            second,
            Err(UserError::AlreadyExists("197810126789".to_string()))
        );
    }

    #[tokio::test]
    async fn test_validation_error_survives_the_actor_boundary() {
        let (actor, client) = crate::user_actor::new(8);
        tokio::spawn(actor.run(()));

        let mut params = UserCreate::from_identity(&Identity::synthetic(), Utc::now());
        params.external_id = "  ".to_string();

        let result = client.create_user(params).await;
        assert!(matches!(result, Err(UserError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_created_user_gets_synthetic_email() {
        let (actor, client) = crate::user_actor::new(8);
        tokio::spawn(actor.run(()));

        let id = client
            .create_user(UserCreate::from_identity(&Identity::synthetic(), Utc::now()))
            .await
            .unwrap();
        let user = client.get(id).await.unwrap().unwrap();
        assert_eq!(user.email, "197810126789@bankid.test");
        assert_eq!(user.role, Role::Participant);
        assert!(user.verified);
    }

    #[tokio::test]
    async fn test_find_by_external_id_with_mock() {
        let mut mock = MockClient::<User>::new();
        mock.expect_find().return_ok(Some(sample_user()));
        mock.expect_find().return_err(FrameworkError::ActorClosed);

        let client = UserClient::new(mock.client());
        let found = client.find_by_external_id("197810126789").await.unwrap();
        assert_eq!(found.map(|u| u.display_name), Some("Erik Svensson".to_string()));

        let closed = client.find_by_external_id("197810126789").await;
        assert!(matches!(closed, Err(UserError::ActorCommunicationError(_))));

        mock.verify();
    }
}
