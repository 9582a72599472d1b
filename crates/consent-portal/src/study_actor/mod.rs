//! # Study Actor
//!
//! Research studies and their enrollment counters. Enrollment is an action on the study
//! record, so the capacity check and the increment happen in one actor turn.
//!
//! ```rust,ignore
//! let remaining = study_client.enroll(study_id.clone()).await?;
//! study_client.release(study_id).await?;
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::StudyClient;
use crate::model::{Study, StudyId};
use portal_framework::ResourceActor;

/// Creates a new Study actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Study>, StudyClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, StudyId::generate);
    (actor, StudyClient::new(generic_client))
}
