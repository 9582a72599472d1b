//! # Consent Actor
//!
//! Consent records depend on two other actors: a record may only be created for a
//! verified user and an active study, and a given consent takes a participant slot. Both
//! clients are injected when the actor starts:
//!
//! ```rust,ignore
//! let (consent_actor, consents) = consent_actor::new(32);
//! tokio::spawn(consent_actor.run((users.clone(), studies.clone())));
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::ConsentClient;
use crate::model::{ConsentId, ConsentRecord};
use portal_framework::ResourceActor;

/// Creates a new Consent actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<ConsentRecord>, ConsentClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, ConsentId::generate);
    (actor, ConsentClient::new(generic_client))
}
