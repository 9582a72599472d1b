//! # Portal Framework
//!
//! Record actors for the consent portal: every record type (users, studies, consent
//! records, Bank ID orders) is owned by one [`ResourceActor`] task and reached through a
//! cloneable [`ResourceClient`].
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]) - the record, its DTOs and lifecycle hooks.
//! 2. **Runtime** ([`ResourceActor`]) - sequential message processing over an in-memory store.
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]) - typed async calls.
//!
//! ## Requests
//!
//! Create, Get, Update, Delete and Action map to the record lifecycle. `Find` and `List`
//! evaluate a [`Filter`] inside the actor, which is how records are looked up by
//! attributes other than their id. An entity that reports a [`unique_key`](ActorEntity::unique_key)
//! gets create-time uniqueness from the actor, because all creates are serialized there.
//!
//! ## Context Injection
//!
//! Dependencies are passed to `run(context)` rather than `new()`, so actors can be created
//! first and wired afterwards:
//!
//! ```rust,ignore
//! let (user_actor, users) = ResourceActor::<User>::new(32, next_user_id);
//! let (consent_actor, consents) = ResourceActor::<ConsentRecord>::new(32, next_consent_id);
//! tokio::spawn(user_actor.run(()));
//! tokio::spawn(consent_actor.run((users.clone(), studies.clone())));
//! ```
//!
//! ## Concurrency Model
//!
//! - Each actor runs in its own Tokio task.
//! - Messages are processed sequentially within an actor; no locks around the store.
//! - An actor stops when the last client is dropped.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers requests from scripted expectations so the code around a
//! client can be tested without spawning actors.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Filter, ResourceRequest, Response};
