//! The session actor.
//!
//! [`SessionHolder::run`] processes requests strictly in arrival order, so transitions are
//! applied in the order they were published. Every applied transition is sent to every
//! subscriber over its own unbounded channel; a slow subscriber delays nobody and misses
//! nothing.

use super::state::{LoginAttempt, SessionEvent, SessionMachine, SessionState};
use super::store::{PersistedSession, SessionStore, SessionStoreError};
use crate::clock::Clock;
use portal_framework::FrameworkError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

enum SessionRequest {
    Publish(SessionEvent),
    Snapshot(oneshot::Sender<SessionState>),
    Subscribe(oneshot::Sender<mpsc::UnboundedReceiver<SessionState>>),
}

pub struct SessionHolder {
    receiver: mpsc::UnboundedReceiver<SessionRequest>,
    machine: SessionMachine,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    subscribers: Vec<mpsc::UnboundedSender<SessionState>>,
}

/// Cloneable access to a running [`SessionHolder`].
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::UnboundedSender<SessionRequest>,
    next_attempt: Arc<AtomicU64>,
}

impl SessionHolder {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> (Self, SessionHandle) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let holder = Self {
            receiver,
            machine: SessionMachine::default(),
            store,
            clock,
            subscribers: Vec::new(),
        };
        let handle = SessionHandle {
            sender,
            next_attempt: Arc::new(AtomicU64::new(1)),
        };
        (holder, handle)
    }

    /// Restores any stored session, then serves requests until every handle is dropped.
    pub async fn run(mut self) {
        self.restore().await;

        while let Some(request) = self.receiver.recv().await {
            match request {
                SessionRequest::Publish(event) => self.apply(event).await,
                SessionRequest::Snapshot(respond_to) => {
                    let _ = respond_to.send(self.machine.state().clone());
                }
                SessionRequest::Subscribe(respond_to) => {
                    let (tx, rx) = mpsc::unbounded_channel();
                    if tx.send(self.machine.state().clone()).is_ok() && respond_to.send(rx).is_ok() {
                        self.subscribers.push(tx);
                    }
                }
            }
        }

        info!("Session holder stopped");
    }

    /// Runs a store call on the blocking pool and waits for it, keeping events ordered.
    async fn with_store<R, F>(&self, op: F) -> Result<R, SessionStoreError>
    where
        F: FnOnce(&dyn SessionStore) -> Result<R, SessionStoreError> + Send + 'static,
        R: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| SessionStoreError::Task(e.to_string()))?
    }

    async fn restore(&mut self) {
        match self.with_store(|store| store.load()).await {
            Ok(Some(session)) => {
                info!(user_id = %session.user.id, "Session restored");
                self.machine.apply(SessionEvent::Restored { user: session.user });
            }
            Ok(None) => debug!("No stored session"),
            Err(e @ SessionStoreError::Corrupt { .. }) => {
                warn!(error = %e, "Discarding unreadable session");
                if let Err(e) = self.with_store(|store| store.clear()).await {
                    warn!(error = %e, "Could not clear session store");
                }
            }
            Err(e) => warn!(error = %e, "Could not load session"),
        }
    }

    async fn apply(&mut self, event: SessionEvent) {
        let persist = match &event {
            SessionEvent::LoginSucceeded { user, .. } => Some(Some(user.clone())),
            SessionEvent::LoggedOut => Some(None),
            _ => None,
        };

        if !self.machine.apply(event) {
            return;
        }

        match persist {
            Some(Some(user)) => {
                let session = PersistedSession {
                    user,
                    token: Uuid::new_v4().to_string(),
                    saved_at: self.clock.now(),
                };
                if let Err(e) = self.with_store(move |store| store.save(&session)).await {
                    warn!(error = %e, "Could not persist session");
                }
            }
            Some(None) => {
                if let Err(e) = self.with_store(|store| store.clear()).await {
                    warn!(error = %e, "Could not clear session store");
                }
            }
            None => {}
        }

        let snapshot = self.machine.state().clone();
        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }
}

impl SessionHandle {
    /// Queues `event` for the holder. Events from one handle are applied in call order.
    pub fn publish(&self, event: SessionEvent) {
        if self.sender.send(SessionRequest::Publish(event)).is_err() {
            debug!("Session holder gone, event dropped");
        }
    }

    /// Starts a new attempt, superseding any attempt still running.
    pub fn begin_login(&self) -> LoginAttempt {
        let attempt = self.next_attempt.fetch_add(1, Ordering::SeqCst);
        self.publish(SessionEvent::LoginStarted { attempt });
        attempt
    }

    pub fn logout(&self) {
        self.publish(SessionEvent::LoggedOut);
    }

    pub fn dismiss_error(&self) {
        self.publish(SessionEvent::ErrorDismissed);
    }

    /// The state after every event published before this call.
    pub async fn snapshot(&self) -> Result<SessionState, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SessionRequest::Snapshot(respond_to))
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)
    }

    /// A stream of states, starting with the current one.
    pub async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<SessionState>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SessionRequest::Subscribe(respond_to))
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)
    }
}
