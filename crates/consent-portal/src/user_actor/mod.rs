//! # User Actor
//!
//! Portal accounts. The personal number (`external_id`) is the record's unique key, so two
//! concurrent first logins for the same person cannot both create a user: the second
//! create is answered with a conflict and the caller falls back to an update.
//!
//! - [`entity`] - [`ActorEntity`](portal_framework::ActorEntity) implementation for [`User`]
//! - [`error`] - [`UserError`]
//! - [`new()`] - creates the actor and its [`UserClient`]

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::UserClient;
use crate::model::{User, UserId};
use portal_framework::ResourceActor;

/// Creates a new User actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<User>, UserClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, UserId::generate);
    (actor, UserClient::new(generic_client))
}
