use crate::auth::Authenticator;
use crate::bankid::wire::{self, Method, WireResponse};
use crate::bankid::{BankIdProvider, CancelHandle, StatusSimulator};
use crate::clients::{ConsentClient, StudyClient, UserClient};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, PortalConfig};
use crate::consent_actor::{self, ConsentError};
use crate::error::AuthError;
use crate::model::{ConsentCreate, ConsentRecord, StudyId, User};
use crate::session::{
    FileSessionStore, MemorySessionStore, SessionHandle, SessionHolder, SessionStore,
};
use crate::{order_actor, study_actor, user_actor};
use portal_framework::FrameworkError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error(transparent)]
    Consent(#[from] ConsentError),

    #[error("Session unavailable: {0}")]
    Session(#[from] FrameworkError),

    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}

/// The running portal: record actors, order registry, simulator, authenticator and
/// session holder.
pub struct Portal {
    pub users: UserClient,
    pub studies: StudyClient,
    pub consents: ConsentClient,
    pub session: SessionHandle,
    provider: Arc<dyn BankIdProvider>,
    authenticator: Authenticator,
    clock: Arc<dyn Clock>,
    /// The login in flight, tagged with its sequence number.
    active_login: Mutex<Option<(u64, CancelHandle)>>,
    next_login: AtomicU64,
    handles: Vec<JoinHandle<()>>,
}

impl Portal {
    /// Validates `config` and starts everything on the system clock. Sessions go to
    /// `session.path` when configured, memory otherwise.
    pub fn start(config: &PortalConfig) -> Result<Self, ConfigError> {
        let store: Arc<dyn SessionStore> = match &config.session.path {
            Some(path) => Arc::new(FileSessionStore::new(path)),
            None => Arc::new(MemorySessionStore::new()),
        };
        Self::with_parts(config, Arc::new(SystemClock), store)
    }

    pub fn with_parts(
        config: &PortalConfig,
        clock: Arc<dyn Clock>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ConfigError> {
        Self::with_provider(config, clock, store, |simulator| Arc::new(simulator))
    }

    /// Like [`Portal::with_parts`], with the simulator wrapped or replaced by `wrap`.
    pub fn with_provider<F>(
        config: &PortalConfig,
        clock: Arc<dyn Clock>,
        store: Arc<dyn SessionStore>,
        wrap: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnOnce(StatusSimulator) -> Arc<dyn BankIdProvider>,
    {
        config.validate()?;
        let buffer_size = config.actors.buffer_size;

        // 1. Create actors (no dependencies yet)
        let (user_actor, users) = user_actor::new(buffer_size);
        let (study_actor, studies) = study_actor::new(buffer_size);
        let (consent_actor, consents) = consent_actor::new(buffer_size);
        let (order_actor, orders) = order_actor::new(buffer_size);
        let (session_holder, session) = SessionHolder::new(store, clock.clone());

        // 2. Start them with their dependencies injected
        let handles = vec![
            tokio::spawn(user_actor.run(())),
            tokio::spawn(study_actor.run(())),
            tokio::spawn(consent_actor.run((users.clone(), studies.clone()))),
            tokio::spawn(order_actor.run(())),
            tokio::spawn(session_holder.run()),
        ];

        let simulator =
            StatusSimulator::new(orders, clock.clone(), config.bankid.completion_after());
        let provider = wrap(simulator);
        let authenticator = Authenticator::new(
            provider.clone(),
            users.clone(),
            clock.clone(),
            config.bankid.poll_config(),
        );

        info!(buffer_size, "Portal started");
        Ok(Self {
            users,
            studies,
            consents,
            session,
            provider,
            authenticator,
            clock,
            active_login: Mutex::new(None),
            next_login: AtomicU64::new(1),
            handles,
        })
    }

    /// Logs in with a personal number, cancelling any login still in flight.
    #[instrument(skip(self))]
    pub async fn login(&self, subject_id: &str) -> Result<User, AuthError> {
        let seq = self.next_login.fetch_add(1, Ordering::SeqCst);
        let (handle, token) = CancelHandle::new();
        if let Some((_, previous)) = self.replace_active_login(Some((seq, handle))) {
            info!("Superseding login in flight");
            previous.cancel();
        }
        let outcome = self
            .authenticator
            .login(subject_id, &self.session, token)
            .await;

        let mut slot = self.lock_active_login();
        if matches!(&*slot, Some((current, _)) if *current == seq) {
            *slot = None;
        }
        outcome
    }

    /// Whether a login started through this portal is still running.
    pub fn login_in_flight(&self) -> bool {
        self.lock_active_login().is_some()
    }

    /// Stops any login in flight and clears the session, including its stored copy.
    pub fn logout(&self) {
        if let Some((_, active)) = self.replace_active_login(None) {
            active.cancel();
        }
        self.session.logout();
        info!("Logged out");
    }

    fn lock_active_login(&self) -> MutexGuard<'_, Option<(u64, CancelHandle)>> {
        self.active_login.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn replace_active_login(
        &self,
        next: Option<(u64, CancelHandle)>,
    ) -> Option<(u64, CancelHandle)> {
        std::mem::replace(&mut *self.lock_active_login(), next)
    }

    /// The logged-in user, if any.
    pub async fn current_user(&self) -> Result<Option<User>, PortalError> {
        Ok(self.session.snapshot().await?.user)
    }

    /// Records the logged-in user's answer for `study_id`.
    #[instrument(skip(self))]
    pub async fn submit_consent(
        &self,
        study_id: StudyId,
        consent_given: bool,
    ) -> Result<ConsentRecord, PortalError> {
        let user = self
            .current_user()
            .await?
            .ok_or(PortalError::NotAuthenticated)?;
        let record = self
            .consents
            .submit_consent(ConsentCreate {
                user_id: user.id,
                study_id,
                consent_given,
                transaction_id: format!("consent-tx-{}", Uuid::new_v4()),
                given_at: self.clock.now(),
            })
            .await?;
        Ok(record)
    }

    /// Withdraws one of the logged-in user's consents.
    #[instrument(skip(self))]
    pub async fn withdraw_consent(
        &self,
        record: &ConsentRecord,
        reason: Option<String>,
    ) -> Result<ConsentRecord, PortalError> {
        let user = self
            .current_user()
            .await?
            .ok_or(PortalError::NotAuthenticated)?;
        if record.user_id != user.id {
            return Err(ConsentError::NotFound(record.id.to_string()).into());
        }
        Ok(self
            .consents
            .withdraw_consent(record.id.clone(), reason, self.clock.now())
            .await?)
    }

    pub fn provider(&self) -> &dyn BankIdProvider {
        self.provider.as_ref()
    }

    /// Serves one request against the Bank ID endpoints.
    pub async fn handle_request(&self, method: Method, path: &str, body: &str) -> WireResponse {
        wire::route(self.provider.as_ref(), method, path, body).await
    }

    /// Drops every client and waits for all actor tasks to finish.
    pub async fn shutdown(self) -> Result<(), PortalError> {
        info!("Shutting down portal");
        if let Some((_, active)) = self.replace_active_login(None) {
            active.cancel();
        }

        let Self {
            users,
            studies,
            consents,
            session,
            provider,
            authenticator,
            handles,
            ..
        } = self;
        drop((users, studies, consents, session, provider, authenticator));

        for handle in handles {
            handle
                .await
                .map_err(|e| PortalError::TaskFailed(e.to_string()))?;
        }

        info!("Portal stopped");
        Ok(())
    }
}
