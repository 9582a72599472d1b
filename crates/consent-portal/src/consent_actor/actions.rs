//! Custom actions for the Consent actor.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum ConsentAction {
    /// Withdraws a given consent and frees the participant's slot in the study.
    Withdraw {
        reason: Option<String>,
        at: DateTime<Utc>,
    },
}
