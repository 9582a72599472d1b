//! # Poller
//!
//! Drives one order to a terminal status: observe, report, sleep, repeat. The loop is
//! bounded by [`PollConfig::max_attempts`], waits a fixed [`PollConfig::interval`] between
//! ticks, and stops early when its [`CancelToken`] fires.

use super::BankIdProvider;
use crate::error::AuthError;
use crate::model::{HintCode, OrderRef, Status, StatusObservation};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, instrument};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// The cancelling side of a login attempt. Cancelling is idempotent.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> (Self, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelToken { rx })
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// The observing side. Cheap to clone; all clones see the same cancellation.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token nobody can cancel.
    pub fn never() -> Self {
        let (_handle, token) = CancelHandle::new();
        token
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Never resolves if the handle is dropped first.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

pub struct Poller {
    provider: Arc<dyn BankIdProvider>,
    config: PollConfig,
}

impl Poller {
    pub fn new(provider: Arc<dyn BankIdProvider>, config: PollConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Polls `reference` until it completes, fails, runs out of attempts or is cancelled.
    ///
    /// `on_update` sees every observation, in order, including the terminal one. An
    /// observation that returns after cancellation is dropped without being reported.
    #[instrument(skip_all, fields(%reference))]
    pub async fn poll<F>(
        &self,
        reference: &OrderRef,
        mut on_update: F,
        cancel: &CancelToken,
    ) -> Result<StatusObservation, AuthError>
    where
        F: FnMut(&StatusObservation) + Send,
    {
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                debug!(attempts, "Cancelled before tick");
                return Err(AuthError::Cancelled);
            }

            let observation = self.provider.observe(reference).await?;
            if cancel.is_cancelled() {
                debug!(attempts, "Cancelled during observe");
                return Err(AuthError::Cancelled);
            }

            debug!(
                attempt = attempts + 1,
                status = %observation.status,
                hint_code = ?observation.hint_code,
                "Observation"
            );
            on_update(&observation);

            match observation.status {
                Status::Complete => return Ok(observation),
                Status::Failed => {
                    let hint_code = observation
                        .hint_code
                        .unwrap_or_else(|| HintCode::Other("unknown".to_string()));
                    return Err(AuthError::Protocol { hint_code });
                }
                Status::Pending => {}
            }

            attempts += 1;
            if attempts >= self.config.max_attempts {
                return Err(AuthError::Timeout { attempts });
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = cancel.cancelled() => {
                    debug!(attempts, "Cancelled while waiting");
                    return Err(AuthError::Cancelled);
                }
            }
        }
    }
}
