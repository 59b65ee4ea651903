//! End-to-end tests for the waitlist pipeline: sweep, notify, confirm,
//! decline, expiry, and the capacity invariant under concurrency.

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    db::handlers::{participants, Participants, Waitlist},
    db::models::waitlist::WaitlistStatus,
    errors::Error,
    messaging::{dummy::DummyProvider, MessagingProvider},
    test_utils::*,
    waitlist::{CapacityChecker, Notifier},
};

fn checker_with_messaging(pool: &PgPool) -> (CapacityChecker, DummyProvider, Arc<dyn MessagingProvider>) {
    let provider = DummyProvider::new();
    let handle = provider.handle();
    let messaging: Arc<dyn MessagingProvider> = Arc::new(provider);
    let config = create_test_config();
    let notifier = Notifier::new(pool.clone(), messaging.clone(), &config);
    let checker = CapacityChecker::new(pool.clone(), notifier, &config);
    (checker, handle, messaging)
}

#[sqlx::test]
async fn test_cancellation_sweep_notifies_with_spot_count(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let class = create_test_class(&pool, club.id, 8).await;

    // All 8 spots taken, then one cancellation frees exactly one.
    let mut enrolled = Vec::new();
    for _ in 0..8 {
        let student = create_test_student(&pool, club.id).await;
        enrolled.push(enroll(&pool, class.id, student.id).await);
    }

    let waiting_student = create_test_student(&pool, club.id).await;
    let entry = join_waitlist(&pool, class.id, waiting_student.id).await;

    {
        let mut conn = pool.acquire().await.unwrap();
        Participants::new(&mut conn).cancel(enrolled[0].id).await.unwrap();
    }

    let (checker, handle, _messaging) = checker_with_messaging(&pool);
    let summary = checker.sweep().await.unwrap();

    assert_eq!(summary.notifications_sent, 1);

    let sent = handle.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("Evening Padel"), "message should name the class: {}", sent[0].text);
    assert!(sent[0].text.contains("1 spot just opened"), "one cancellation frees one spot: {}", sent[0].text);

    // The head of the waitlist was promoted with an offer deadline.
    let mut conn = pool.acquire().await.unwrap();
    let entry = Waitlist::new(&mut conn).get_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(entry.status, WaitlistStatus::Notified);
    assert!(entry.expires_at.is_some());
    assert!(entry.token_id.is_some());
}

#[sqlx::test]
#[test_log::test]
async fn test_confirm_accepts_and_enrolls(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let class = create_test_class(&pool, club.id, 2).await;

    let enrolled_student = create_test_student(&pool, club.id).await;
    enroll(&pool, class.id, enrolled_student.id).await;

    let waiting_student = create_test_student(&pool, club.id).await;
    let entry = join_waitlist(&pool, class.id, waiting_student.id).await;

    let (checker, _handle, messaging) = checker_with_messaging(&pool);
    checker.sweep().await.unwrap();

    let server = create_test_app_with_messaging(pool.clone(), messaging).await;
    let response = server
        .get("/confirm-waitlist")
        .add_query_param("entry", entry.id.to_string())
        .add_query_param("action", "confirm")
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("confirmed"));

    let mut conn = pool.acquire().await.unwrap();
    let entry = Waitlist::new(&mut conn).get_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(entry.status, WaitlistStatus::Accepted);

    let active = Participants::new(&mut conn).count_active(class.id).await.unwrap();
    assert_eq!(active, 2);
}

#[sqlx::test]
async fn test_confirm_after_class_filled_conflicts(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let class = create_test_class(&pool, club.id, 2).await;

    let first = create_test_student(&pool, club.id).await;
    enroll(&pool, class.id, first.id).await;

    let waiting_student = create_test_student(&pool, club.id).await;
    let entry = join_waitlist(&pool, class.id, waiting_student.id).await;

    let (checker, _handle, messaging) = checker_with_messaging(&pool);
    checker.sweep().await.unwrap();

    // The last spot is taken between notification and click.
    let sniper = create_test_student(&pool, club.id).await;
    enroll(&pool, class.id, sniper.id).await;

    let server = create_test_app_with_messaging(pool.clone(), messaging).await;
    let response = server
        .get("/confirm-waitlist")
        .add_query_param("entry", entry.id.to_string())
        .add_query_param("action", "confirm")
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);

    // Capacity never exceeded, entry not accepted.
    let mut conn = pool.acquire().await.unwrap();
    let active = Participants::new(&mut conn).count_active(class.id).await.unwrap();
    assert_eq!(active, 2);
    let entry = Waitlist::new(&mut conn).get_by_id(entry.id).await.unwrap().unwrap();
    assert_ne!(entry.status, WaitlistStatus::Accepted);
}

#[sqlx::test]
async fn test_expired_offer_is_rejected_and_lapses(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let class = create_test_class(&pool, club.id, 2).await;

    let waiting_student = create_test_student(&pool, club.id).await;
    let entry = join_waitlist(&pool, class.id, waiting_student.id).await;

    let (checker, _handle, messaging) = checker_with_messaging(&pool);
    checker.sweep().await.unwrap();
    expire_entry(&pool, entry.id).await;

    let server = create_test_app_with_messaging(pool.clone(), messaging).await;
    for action in ["confirm", "decline"] {
        let response = server
            .get("/confirm-waitlist")
            .add_query_param("entry", entry.id.to_string())
            .add_query_param("action", action)
            .await;

        response.assert_status(axum::http::StatusCode::GONE);
    }

    let mut conn = pool.acquire().await.unwrap();
    let entry = Waitlist::new(&mut conn).get_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(entry.status, WaitlistStatus::Skipped);
}

#[sqlx::test]
async fn test_terminal_entries_never_transition_back(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let class = create_test_class(&pool, club.id, 2).await;

    let waiting_student = create_test_student(&pool, club.id).await;
    let entry = join_waitlist(&pool, class.id, waiting_student.id).await;

    let (checker, _handle, messaging) = checker_with_messaging(&pool);
    checker.sweep().await.unwrap();

    let server = create_test_app_with_messaging(pool.clone(), messaging).await;

    // Decline first, then try to confirm the same entry.
    let response = server
        .get("/confirm-waitlist")
        .add_query_param("entry", entry.id.to_string())
        .add_query_param("action", "decline")
        .await;
    response.assert_status_ok();

    let response = server
        .get("/confirm-waitlist")
        .add_query_param("entry", entry.id.to_string())
        .add_query_param("action", "confirm")
        .await;
    response.assert_status(axum::http::StatusCode::GONE);

    let mut conn = pool.acquire().await.unwrap();
    let entry = Waitlist::new(&mut conn).get_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(entry.status, WaitlistStatus::Skipped);
}

#[sqlx::test]
async fn test_decline_cascades_one_offer_to_next_candidate(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let class = create_test_class(&pool, club.id, 2).await;

    let first = create_test_student(&pool, club.id).await;
    let second = create_test_student(&pool, club.id).await;
    let first_entry = join_waitlist(&pool, class.id, first.id).await;
    let second_entry = join_waitlist(&pool, class.id, second.id).await;

    let (checker, handle, messaging) = checker_with_messaging(&pool);
    checker.sweep().await.unwrap();
    assert_eq!(handle.sent().len(), 1);

    let server = create_test_app_with_messaging(pool.clone(), messaging).await;
    let response = server
        .get("/confirm-waitlist")
        .add_query_param("entry", first_entry.id.to_string())
        .add_query_param("action", "decline")
        .await;
    response.assert_status_ok();

    // Exactly one re-notification, offering one spot.
    let sent = handle.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].text.contains("1 spot just opened"), "cascade offers one spot: {}", sent[1].text);

    let mut conn = pool.acquire().await.unwrap();
    let first_entry = Waitlist::new(&mut conn).get_by_id(first_entry.id).await.unwrap().unwrap();
    let second_entry = Waitlist::new(&mut conn).get_by_id(second_entry.id).await.unwrap().unwrap();
    assert_eq!(first_entry.status, WaitlistStatus::Skipped);
    assert_eq!(second_entry.status, WaitlistStatus::Notified);
}

#[sqlx::test]
async fn test_sweep_cooldown_suppresses_repeat_notifications(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let class = create_test_class(&pool, club.id, 4).await;

    let student = create_test_student(&pool, club.id).await;
    join_waitlist(&pool, class.id, student.id).await;

    let (checker, handle, _messaging) = checker_with_messaging(&pool);

    let first = checker.sweep().await.unwrap();
    assert_eq!(first.notifications_sent, 1);

    let second = checker.sweep().await.unwrap();
    assert_eq!(second.notifications_sent, 0);
    assert_eq!(second.cooldown_suppressed, 1);
    assert_eq!(handle.sent().len(), 1);

    // Once the cooldown has passed, sweeps may notify again.
    age_tokens(&pool, class.id).await;
    let third = checker.sweep().await.unwrap();
    assert_eq!(third.notifications_sent, 1);
    assert_eq!(handle.sent().len(), 2);
}

#[sqlx::test]
async fn test_manual_notify_bypasses_cooldown(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let (_key, secret) = create_club_key(&pool, club.id).await;
    let class = create_test_class(&pool, club.id, 4).await;

    let (checker, handle, messaging) = checker_with_messaging(&pool);
    checker.sweep().await.unwrap();
    assert_eq!(handle.sent().len(), 1);

    let server = create_test_app_with_messaging(pool.clone(), messaging).await;
    let response = server
        .post(&format!("/api/v1/classes/{}/waitlist/notify", class.id))
        .authorization_bearer(&secret)
        .await;

    response.assert_status_ok();
    assert_eq!(handle.sent().len(), 2, "manual trigger is not cooldown-limited");
}

#[sqlx::test]
async fn test_racing_claims_never_exceed_capacity(pool: PgPool) {
    let club = create_test_club(&pool).await;
    let class = create_test_class(&pool, club.id, 1).await;

    let alice = create_test_student(&pool, club.id).await;
    let bob = create_test_student(&pool, club.id).await;

    let (a, b) = tokio::join!(
        participants::claim_spot(&pool, class.id, alice.id),
        participants::claim_spot(&pool, class.id, bob.id),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one claim wins the last spot");

    let conflict = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(conflict, Error::Conflict { .. }), "loser gets a capacity conflict");

    let mut conn = pool.acquire().await.unwrap();
    let active = Participants::new(&mut conn).count_active(class.id).await.unwrap();
    assert_eq!(active, 1);
}
