//! Demo run: log in with the test person, consent to a study, withdraw, log out.
//!
//! ```bash
//! RUST_LOG=info cargo run -p consent-portal
//! CONSENT_COMPLETION_AFTER_MS=500 CONSENT_POLL_INTERVAL_MS=200 RUST_LOG=debug cargo run -p consent-portal
//! ```

use chrono::Utc;
use consent_portal::config::PortalConfig;
use consent_portal::model::{StudyCreate, StudyStatus};
use consent_portal::Portal;
use portal_framework::tracing::setup_tracing;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = PortalConfig::load(None).map_err(|e| e.to_string())?;
    let portal = Portal::start(&config).map_err(|e| e.to_string())?;

    let study_id = portal
        .studies
        .create_study(StudyCreate {
            title: "Sleep and memory in adults".to_string(),
            description: Some("Eight weeks of sleep diaries and two memory tests.".to_string()),
            status: StudyStatus::Active,
            max_participants: 50,
            consent_document: Some("sleep-memory-consent-v1.pdf".to_string()),
            created_at: Utc::now(),
        })
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("login");
    let login = portal.login("19781012-6789").instrument(span).await;
    let user = match login {
        Ok(user) => user,
        Err(e) => {
            error!(kind = ?e.kind(), error = %e, "Login failed");
            portal.shutdown().await.map_err(|e| e.to_string())?;
            return Err(e.to_string());
        }
    };
    info!(user = %user.display_name, email = %user.email, "Logged in");

    for study in portal.studies.list_active().await.map_err(|e| e.to_string())? {
        info!(title = %study.title, remaining = study.remaining_slots(), "Active study");
    }

    let record = portal
        .submit_consent(study_id.clone(), true)
        .await
        .map_err(|e| e.to_string())?;
    info!(consent_id = %record.id, "Consent given");

    let withdrawn = portal
        .withdraw_consent(&record, Some("Changed my mind".to_string()))
        .await
        .map_err(|e| e.to_string())?;
    info!(consent_id = %withdrawn.id, active = withdrawn.is_active(), "Consent withdrawn");

    portal.logout();
    portal.shutdown().await.map_err(|e| e.to_string())?;

    info!("Demo completed");
    Ok(())
}
