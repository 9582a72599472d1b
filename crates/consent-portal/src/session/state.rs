use crate::model::{StatusObservation, User};
use serde::Serialize;
use tracing::debug;

/// Sequence number of a login attempt, assigned by the session handle.
pub type LoginAttempt = u64;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<User>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub last_status: Option<StatusObservation>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LoginStarted {
        attempt: LoginAttempt,
    },
    StatusObserved {
        attempt: LoginAttempt,
        observation: StatusObservation,
    },
    LoginSucceeded {
        attempt: LoginAttempt,
        user: User,
    },
    LoginFailed {
        attempt: LoginAttempt,
        message: String,
    },
    /// The attempt was cancelled without a replacement; only clears the spinner.
    LoginCancelled {
        attempt: LoginAttempt,
    },
    Restored {
        user: User,
    },
    ErrorDismissed,
    LoggedOut,
}

impl SessionEvent {
    /// The attempt the event belongs to, if it belongs to one.
    pub fn attempt(&self) -> Option<LoginAttempt> {
        match self {
            SessionEvent::LoginStarted { attempt }
            | SessionEvent::StatusObserved { attempt, .. }
            | SessionEvent::LoginSucceeded { attempt, .. }
            | SessionEvent::LoginFailed { attempt, .. }
            | SessionEvent::LoginCancelled { attempt } => Some(*attempt),
            SessionEvent::Restored { .. } | SessionEvent::ErrorDismissed | SessionEvent::LoggedOut => {
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SessionEvent::LoginStarted { .. } => "LoginStarted",
            SessionEvent::StatusObserved { .. } => "StatusObserved",
            SessionEvent::LoginSucceeded { .. } => "LoginSucceeded",
            SessionEvent::LoginFailed { .. } => "LoginFailed",
            SessionEvent::LoginCancelled { .. } => "LoginCancelled",
            SessionEvent::Restored { .. } => "Restored",
            SessionEvent::ErrorDismissed => "ErrorDismissed",
            SessionEvent::LoggedOut => "LoggedOut",
        }
    }
}

/// The session reducer plus the number of the attempt it currently listens to.
///
/// Events from any other attempt are stale: a superseded or logged-out attempt can never
/// write into the state.
#[derive(Debug, Default)]
pub struct SessionMachine {
    state: SessionState,
    active: Option<LoginAttempt>,
}

impl SessionMachine {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn active_attempt(&self) -> Option<LoginAttempt> {
        self.active
    }

    /// Applies `event`. Returns `false` if it was stale and ignored.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        if let Some(attempt) = event.attempt() {
            let starts = matches!(event, SessionEvent::LoginStarted { .. });
            if !starts && self.active != Some(attempt) {
                debug!(event = event.name(), attempt, active = ?self.active, "Stale event ignored");
                return false;
            }
        }

        debug!(event = event.name(), "Session transition");
        match event {
            SessionEvent::LoginStarted { attempt } => {
                self.active = Some(attempt);
                self.state.is_loading = true;
                self.state.error = None;
                self.state.last_status = None;
            }
            SessionEvent::StatusObserved { observation, .. } => {
                self.state.last_status = Some(observation);
            }
            SessionEvent::LoginSucceeded { user, .. } => {
                self.active = None;
                self.state.user = Some(user);
                self.state.error = None;
                self.state.is_loading = false;
            }
            SessionEvent::LoginFailed { message, .. } => {
                self.active = None;
                self.state.error = Some(message);
                self.state.is_loading = false;
            }
            SessionEvent::LoginCancelled { .. } => {
                self.active = None;
                self.state.is_loading = false;
            }
            SessionEvent::Restored { user } => {
                self.state.user = Some(user);
            }
            SessionEvent::ErrorDismissed => {
                self.state.error = None;
            }
            SessionEvent::LoggedOut => {
                self.active = None;
                self.state = SessionState::default();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HintCode, Identity, Role, UserId};
    use chrono::Utc;

    fn user() -> User {
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

    #[test]
    fn test_successful_login_sequence() {
        let mut machine = SessionMachine::default();
        let pending = StatusObservation::pending(HintCode::OutstandingTransaction);

        assert!(machine.apply(SessionEvent::LoginStarted { attempt: 1 }));
        assert!(machine.state().is_loading);

        assert!(machine.apply(SessionEvent::StatusObserved {
            attempt: 1,
            observation: pending.clone(),
        }));
        assert_eq!(machine.state().last_status, Some(pending));

        assert!(machine.apply(SessionEvent::LoginSucceeded {
            attempt: 1,
            user: user(),
        }));
        let state = machine.state();
        assert!(state.is_authenticated());
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(machine.active_attempt(), None);
    }

    #[test]
    fn test_new_attempt_clears_error_and_last_status() {
        let mut machine = SessionMachine::default();
        machine.apply(SessionEvent::LoginStarted { attempt: 1 });
        machine.apply(SessionEvent::StatusObserved {
            attempt: 1,
            observation: StatusObservation::failed(HintCode::UserCancel),
        });
        machine.apply(SessionEvent::LoginFailed {
            attempt: 1,
            message: "Bank ID authentication failed: userCancel".to_string(),
        });
        assert!(machine.state().error.is_some());
        assert!(!machine.state().is_loading);

        machine.apply(SessionEvent::LoginStarted { attempt: 2 });
        assert!(machine.state().error.is_none());
        assert!(machine.state().last_status.is_none());
        assert!(machine.state().is_loading);
    }

    #[test]
    fn test_superseded_attempt_cannot_write() {
        let mut machine = SessionMachine::default();
        machine.apply(SessionEvent::LoginStarted { attempt: 1 });
        machine.apply(SessionEvent::LoginStarted { attempt: 2 });

        assert!(!machine.apply(SessionEvent::LoginSucceeded {
            attempt: 1,
            user: user(),
        }));
        assert!(!machine.apply(SessionEvent::StatusObserved {
            attempt: 1,
            observation: StatusObservation::complete(Identity::synthetic()),
        }));
        assert!(machine.state().user.is_none());
        assert!(machine.state().last_status.is_none());
        assert_eq!(machine.active_attempt(), Some(2));
    }

    #[test]
    fn test_completion_after_logout_does_not_resurrect_session() {
        let mut machine = SessionMachine::default();
        machine.apply(SessionEvent::LoginStarted { attempt: 1 });
        machine.apply(SessionEvent::LoggedOut);

        assert!(!machine.apply(SessionEvent::LoginSucceeded {
            attempt: 1,
            user: user(),
        }));
        assert_eq!(machine.state(), &SessionState::default());
    }

    #[test]
    fn test_logout_resets_everything() {
        let mut machine = SessionMachine::default();
        machine.apply(SessionEvent::Restored { user: user() });
        machine.apply(SessionEvent::LoginStarted { attempt: 3 });
        machine.apply(SessionEvent::LoggedOut);
        assert_eq!(machine.state(), &SessionState::default());
    }

    #[test]
    fn test_cancel_clears_spinner_but_keeps_user() {
        let mut machine = SessionMachine::default();
        machine.apply(SessionEvent::Restored { user: user() });
        machine.apply(SessionEvent::LoginStarted { attempt: 1 });
        machine.apply(SessionEvent::LoginCancelled { attempt: 1 });

        assert!(!machine.state().is_loading);
        assert!(machine.state().is_authenticated());
    }

    #[test]
    fn test_error_can_be_dismissed() {
        let mut machine = SessionMachine::default();
        machine.apply(SessionEvent::LoginStarted { attempt: 1 });
        machine.apply(SessionEvent::LoginFailed {
            attempt: 1,
            message: "timed out".to_string(),
        });
        machine.apply(SessionEvent::ErrorDismissed);
        assert!(machine.state().error.is_none());
    }
}
