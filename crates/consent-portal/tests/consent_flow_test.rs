use chrono::Utc;
use consent_portal::clock::SystemClock;
use consent_portal::config::PortalConfig;
use consent_portal::consent_actor::ConsentError;
use consent_portal::lifecycle::PortalError;
use consent_portal::model::{
    ConsentCreate, Role, StudyCreate, StudyId, StudyStatus, UserCreate, UserId,
};
use consent_portal::session::MemorySessionStore;
use consent_portal::Portal;
use std::sync::Arc;

/// A portal whose simulated orders complete on the first status check.
fn instant_portal() -> Portal {
    let mut config = PortalConfig::default();
    config.bankid.completion_after_ms = 0;
    Portal::with_parts(
        &config,
        Arc::new(SystemClock),
        Arc::new(MemorySessionStore::new()),
    )
    .unwrap()
}

async fn create_study(portal: &Portal, status: StudyStatus, max_participants: u32) -> StudyId {
    portal
        .studies
        .create_study(StudyCreate {
            title: "Heart rate variability".to_string(),
            description: Some("Wearable sensor study".to_string()),
            status,
            max_participants,
            consent_document: Some("hrv-consent.pdf".to_string()),
            created_at: Utc::now(),
        })
        .await
        .unwrap()
}

async fn verified_user(portal: &Portal, external_id: &str) -> UserId {
    portal
        .users
        .create_user(UserCreate {
            external_id: external_id.to_string(),
            display_name: "Karin Lund".to_string(),
            role: Role::Participant,
            verified: true,
            authenticated_at: Some(Utc::now()),
            created_at: Utc::now(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_consent_requires_login() {
    let portal = instant_portal();
    let study_id = create_study(&portal, StudyStatus::Active, 10).await;

    let result = portal.submit_consent(study_id, true).await;
    assert!(matches!(result, Err(PortalError::NotAuthenticated)));

    portal.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_give_and_withdraw_consent_moves_enrollment() {
    let portal = instant_portal();
    let user = portal.login("19781012-6789").await.unwrap();
    let study_id = create_study(&portal, StudyStatus::Active, 1).await;

    let record = portal.submit_consent(study_id.clone(), true).await.unwrap();
    assert!(record.is_active());
    assert_eq!(record.user_id, user.id);
    assert!(record.transaction_id.starts_with("consent-tx-"));
    assert_eq!(portal.studies.capacity(study_id.clone()).await.unwrap().enrolled, 1);

    // The only slot is taken.
    let other = verified_user(&portal, "19850505-4321").await;
    let full = portal
        .consents
        .submit_consent(ConsentCreate {
            user_id: other,
            study_id: study_id.clone(),
            consent_given: true,
            transaction_id: "tx-full".to_string(),
            given_at: Utc::now(),
        })
        .await;
    assert!(matches!(full, Err(ConsentError::EnrollmentFailed(_))));

    let withdrawn = portal
        .withdraw_consent(&record, Some("Moving abroad".to_string()))
        .await
        .unwrap();
    assert!(!withdrawn.is_active());
    assert_eq!(withdrawn.withdrawal_reason.as_deref(), Some("Moving abroad"));
    assert_eq!(portal.studies.capacity(study_id.clone()).await.unwrap().enrolled, 0);

    let again = portal.withdraw_consent(&record, None).await;
    assert!(matches!(
        again,
        Err(PortalError::Consent(ConsentError::AlreadyWithdrawn(_)))
    ));

    let latest = portal
        .consents
        .latest_for(&user.id, &study_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, record.id);
    assert!(latest.withdrawn_at.is_some());

    portal.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_active_consent_cannot_be_given_twice() {
    let portal = instant_portal();
    portal.login("19781012-6789").await.unwrap();
    let study_id = create_study(&portal, StudyStatus::Active, 5).await;

    let first = portal.submit_consent(study_id.clone(), true).await.unwrap();
    let second = portal.submit_consent(study_id.clone(), true).await;
    assert!(matches!(
        second,
        Err(PortalError::Consent(ConsentError::AlreadyAnswered(_)))
    ));
    assert_eq!(portal.studies.capacity(study_id.clone()).await.unwrap().enrolled, 1);

    // Withdrawing frees the study for a fresh answer.
    portal.withdraw_consent(&first, None).await.unwrap();
    let renewed = portal.submit_consent(study_id.clone(), true).await.unwrap();
    assert!(renewed.is_active());
    assert_eq!(portal.studies.capacity(study_id).await.unwrap().enrolled, 1);

    portal.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_declined_consent_takes_no_slot_and_cannot_be_withdrawn() {
    let portal = instant_portal();
    portal.login("19781012-6789").await.unwrap();
    let study_id = create_study(&portal, StudyStatus::Active, 3).await;

    let declined = portal.submit_consent(study_id.clone(), false).await.unwrap();
    assert!(!declined.is_active());
    assert_eq!(portal.studies.capacity(study_id).await.unwrap().enrolled, 0);

    let result = portal.withdraw_consent(&declined, None).await;
    assert!(matches!(
        result,
        Err(PortalError::Consent(ConsentError::NotGiven(_)))
    ));

    portal.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_inactive_study_rejects_consent() {
    let portal = instant_portal();
    portal.login("19781012-6789").await.unwrap();
    let draft = create_study(&portal, StudyStatus::Draft, 3).await;

    let result = portal.submit_consent(draft, true).await;
    assert!(matches!(
        result,
        Err(PortalError::Consent(ConsentError::StudyNotRecruiting(_)))
    ));

    let missing = portal
        .submit_consent(StudyId::new("study_missing"), true)
        .await;
    assert!(matches!(
        missing,
        Err(PortalError::Consent(ConsentError::InvalidStudy(_)))
    ));

    portal.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unverified_user_cannot_consent() {
    let portal = instant_portal();
    let study_id = create_study(&portal, StudyStatus::Active, 3).await;

    let user_id = portal
        .users
        .create_user(UserCreate {
            external_id: "19900101-1234".to_string(),
            display_name: "Anna Berg".to_string(),
            role: Role::Participant,
            verified: false,
            authenticated_at: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let result = portal
        .consents
        .submit_consent(ConsentCreate {
            user_id,
            study_id,
            consent_given: true,
            transaction_id: "tx-1".to_string(),
            given_at: Utc::now(),
        })
        .await;
    assert!(matches!(result, Err(ConsentError::UnverifiedUser(_))));

    portal.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_records_are_listed_newest_first() {
    let portal = instant_portal();
    let user = portal.login("19781012-6789").await.unwrap();
    let first_study = create_study(&portal, StudyStatus::Active, 3).await;
    let second_study = create_study(&portal, StudyStatus::Active, 3).await;

    let older = portal.submit_consent(first_study, true).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = portal.submit_consent(second_study, false).await.unwrap();

    let records = portal.consents.list_for_user(&user.id).await.unwrap();
    let ids: Vec<_> = records.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    portal.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_logout_then_login_again_keeps_one_account() {
    let portal = instant_portal();

    let first = portal.login("19781012-6789").await.unwrap();
    portal.logout();
    assert!(portal.current_user().await.unwrap().is_none());

    let second = portal.login("19781012-6789").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(portal.current_user().await.unwrap(), Some(second));

    portal.shutdown().await.unwrap();
}
