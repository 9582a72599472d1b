//! # Consent Portal
//!
//! Participants log in with a (simulated) Bank ID, browse research studies and give or
//! withdraw consent.
//!
//! - **[bankid]**: the provider seam, the status simulator, the poller and the endpoint
//!   handlers.
//! - **[auth]**: the [`Authenticator`](auth::Authenticator) that runs one login end to end.
//! - **[session]**: the session holder actor and its stores.
//! - **[model]**: records and value types.
//! - **[clients]**, **[user_actor]**, **[study_actor]**, **[consent_actor]**,
//!   **[order_actor]**: record actors on top of `portal-framework`.
//! - **[lifecycle]**: the [`Portal`](lifecycle::Portal) composition root.
//! - **[config]**: TOML + environment configuration.

pub mod auth;
pub mod bankid;
pub mod clients;
pub mod clock;
pub mod config;
pub mod consent_actor;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod session;
pub mod study_actor;
pub mod user_actor;

pub use error::{AuthError, AuthErrorKind};
pub use lifecycle::Portal;
