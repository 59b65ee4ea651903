//! Payment settlement tests against the dummy provider.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    db::handlers::{Participants, Payments},
    db::models::{participants::ParticipantPaymentStatus, payments::PaymentState},
    payment_providers::{dummy::DummyProvider, PaymentProvider},
    test_utils::*,
};

async fn checkout_session(pool: &PgPool, provider: &DummyProvider) -> (crate::types::ParticipantId, String) {
    let club = create_test_club(pool).await;
    let class = create_test_class(pool, club.id, 4).await;
    let student = create_test_student(pool, club.id).await;
    let participant = enroll(pool, class.id, student.id).await;

    let checkout = crate::payment_providers::CheckoutContext {
        participant_id: participant.id,
        club_id: club.id,
        student_email: student.email,
    };

    let url = provider
        .create_checkout_session(pool, &checkout, "http://x/cancel", "http://x/ok?session={CHECKOUT_SESSION_ID}")
        .await
        .unwrap();
    let session_id = url.split("session=").nth(1).unwrap().to_string();

    (participant.id, session_id)
}

#[sqlx::test]
async fn test_settlement_marks_payment_and_participant(pool: PgPool) {
    let provider = DummyProvider::new(Decimal::new(2500, 2));
    let (participant_id, session_id) = checkout_session(&pool, &provider).await;

    provider.process_payment_session(&pool, &session_id).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let payment = Payments::new(&mut conn).get_by_source_id(&session_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentState::Paid);
    assert_eq!(payment.amount, Decimal::new(2500, 2));
    assert!(payment.paid_at.is_some());

    let participant = Participants::new(&mut conn).get_by_id(participant_id).await.unwrap().unwrap();
    assert_eq!(participant.payment_status, ParticipantPaymentStatus::Paid);
}

#[sqlx::test]
async fn test_processing_is_idempotent(pool: PgPool) {
    let provider = DummyProvider::new(Decimal::new(2500, 2));
    let (_participant_id, session_id) = checkout_session(&pool, &provider).await;

    // Duplicate webhook deliveries and manual retries hit the same path.
    provider.process_payment_session(&pool, &session_id).await.unwrap();
    provider.process_payment_session(&pool, &session_id).await.unwrap();
    provider.process_payment_session(&pool, &session_id).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE source_id = $1")
        .bind(&session_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1, "exactly one payment row regardless of retries");
}

#[sqlx::test]
async fn test_unknown_participant_reference_is_rejected(pool: PgPool) {
    let provider = DummyProvider::new(Decimal::new(2500, 2));

    let session_id = format!("dummy_session_{}_{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
    let result = provider.process_payment_session(&pool, &session_id).await;

    assert!(result.is_err(), "settling a session for a missing participant must fail");
}
