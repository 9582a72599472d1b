//! # Session
//!
//! The login state every view renders from. A [`SessionHolder`] task owns the
//! [`SessionState`] and applies [`SessionEvent`]s one at a time through a
//! [`SessionMachine`]; [`SessionHandle`]s publish events and hand out snapshots and
//! subscriptions. Persistence goes through a [`SessionStore`].

pub mod holder;
pub mod state;
pub mod store;

pub use holder::{SessionHandle, SessionHolder};
pub use state::{LoginAttempt, SessionEvent, SessionMachine, SessionState};
pub use store::{
    FileSessionStore, MemorySessionStore, PersistedSession, SessionStore, SessionStoreError,
};
