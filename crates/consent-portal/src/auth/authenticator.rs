//! # Authenticator
//!
//! One login, end to end:
//!
//! 1. `LoginStarted` is published (spinner on, previous error cleared).
//! 2. The provider initiates an order for the personal number.
//! 3. The [`Poller`] drives the order; each observation is published as `StatusObserved`.
//! 4. The order is discarded, whatever the outcome.
//! 5. The completion identity is upserted into the user store.
//! 6. `LoginSucceeded` or `LoginFailed` is published.
//!
//! A cancelled login publishes only `LoginCancelled`, which the session ignores once a
//! newer attempt or a logout has taken over.

use crate::bankid::{BankIdProvider, CancelToken, PollConfig, Poller};
use crate::clients::UserClient;
use crate::clock::Clock;
use crate::error::AuthError;
use crate::model::{Identity, User, UserCreate, UserUpdate};
use crate::session::{LoginAttempt, SessionEvent, SessionHandle};
use crate::user_actor::UserError;
use portal_framework::ActorClient;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct Authenticator {
    provider: Arc<dyn BankIdProvider>,
    poller: Poller,
    users: UserClient,
    clock: Arc<dyn Clock>,
}

impl Authenticator {
    pub fn new(
        provider: Arc<dyn BankIdProvider>,
        users: UserClient,
        clock: Arc<dyn Clock>,
        poll: PollConfig,
    ) -> Self {
        Self {
            poller: Poller::new(provider.clone(), poll),
            provider,
            users,
            clock,
        }
    }

    #[instrument(skip(self, session, cancel))]
    pub async fn login(
        &self,
        subject_id: &str,
        session: &SessionHandle,
        cancel: CancelToken,
    ) -> Result<User, AuthError> {
        let attempt = session.begin_login();
        let result = self.authenticate(subject_id, session, attempt, &cancel).await;

        match &result {
            Ok(user) => {
                info!(attempt, user_id = %user.id, "Login complete");
                session.publish(SessionEvent::LoginSucceeded {
                    attempt,
                    user: user.clone(),
                });
            }
            Err(AuthError::Cancelled) => {
                info!(attempt, "Login cancelled");
                session.publish(SessionEvent::LoginCancelled { attempt });
            }
            Err(e) => {
                warn!(attempt, kind = ?e.kind(), error = %e, "Login failed");
                session.publish(SessionEvent::LoginFailed {
                    attempt,
                    message: e.to_string(),
                });
            }
        }
        result
    }

    async fn authenticate(
        &self,
        subject_id: &str,
        session: &SessionHandle,
        attempt: LoginAttempt,
        cancel: &CancelToken,
    ) -> Result<User, AuthError> {
        let order = self.provider.initiate(subject_id).await?;

        let outcome = self
            .poller
            .poll(
                &order.reference,
                |observation| {
                    session.publish(SessionEvent::StatusObserved {
                        attempt,
                        observation: observation.clone(),
                    })
                },
                cancel,
            )
            .await;
        self.provider.discard(&order.reference).await;

        let identity = outcome?
            .identity
            .ok_or_else(|| AuthError::backend("completion carried no identity"))?;
        let user = self.upsert_user(&identity).await?;

        if cancel.is_cancelled() {
            return Err(AuthError::Cancelled);
        }
        Ok(user)
    }

    /// Creates the user for `identity`, or refreshes the existing one.
    ///
    /// The user store rejects a second record for the same personal number, so when a
    /// concurrent login creates it first this falls back to updating that record.
    #[instrument(skip(self, identity), fields(external_id = %identity.external_id))]
    pub async fn upsert_user(&self, identity: &Identity) -> Result<User, AuthError> {
        let now = self.clock.now();

        if let Some(existing) = self
            .users
            .find_by_external_id(&identity.external_id)
            .await
            .map_err(AuthError::backend)?
        {
            debug!(user_id = %existing.id, "Updating existing user");
            return self
                .users
                .update_user(existing.id, UserUpdate::from_identity(identity, now))
                .await
                .map_err(AuthError::backend);
        }

        match self
            .users
            .create_user(UserCreate::from_identity(identity, now))
            .await
        {
            Ok(id) => {
                info!(user_id = %id, "User created");
                self.users
                    .get(id.clone())
                    .await
                    .map_err(AuthError::backend)?
                    .ok_or_else(|| AuthError::backend(UserError::NotFound(id.to_string())))
            }
            Err(UserError::AlreadyExists(_)) => {
                debug!("Lost create race, updating instead");
                let existing = self
                    .users
                    .find_by_external_id(&identity.external_id)
                    .await
                    .map_err(AuthError::backend)?
                    .ok_or_else(|| {
                        AuthError::backend(UserError::NotFound(identity.external_id.clone()))
                    })?;
                self.users
                    .update_user(existing.id, UserUpdate::from_identity(identity, now))
                    .await
                    .map_err(AuthError::backend)
            }
            Err(e) => Err(AuthError::backend(e)),
        }
    }
}
