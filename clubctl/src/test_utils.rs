//! Shared fixtures for integration tests.

use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    build_router,
    config::Config,
    crypto,
    db::{
        handlers::{participants, Classes, Clubs, Repository, StaffKeys, Students, Waitlist},
        models::{
            classes::{ClassCreateDBRequest, ProgrammedClass},
            clubs::{Club, ClubCreateDBRequest},
            participants::ClassParticipant,
            staff_keys::{StaffKey, StaffKeyCreateDBRequest},
            students::{Student, StudentCreateDBRequest},
            waitlist::WaitlistEntry,
        },
    },
    messaging::{dummy::DummyProvider, MessagingProvider},
    types::{ClassId, ClubId, StudentId},
    AppState,
};

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.public_url = "http://testserver".to_string();
    config.payment = Some(crate::config::PaymentConfig::Dummy(crate::config::DummyPaymentConfig::default()));
    config.background_services.capacity_sweeper.enabled = false;
    config
}

/// Build a test server over the given pool with a dummy messaging provider.
/// Returns the provider handle so tests can assert on sent messages.
pub async fn create_test_app(pool: PgPool) -> (axum_test::TestServer, DummyProvider) {
    let provider = DummyProvider::new();
    let handle = provider.handle();
    let server = create_test_app_with_messaging(pool, Arc::new(provider)).await;
    (server, handle)
}

pub async fn create_test_app_with_messaging(pool: PgPool, messaging: Arc<dyn MessagingProvider>) -> axum_test::TestServer {
    let config = create_test_config();
    let payments = config.payment.as_ref().map(crate::payment_providers::create_provider);

    let state = AppState::builder()
        .db(pool)
        .config(config)
        .messaging(messaging)
        .maybe_payments(payments)
        .build();

    axum_test::TestServer::new(build_router(&state)).expect("Failed to create test server")
}

pub async fn create_platform_key(pool: &PgPool) -> (StaffKey, String) {
    let secret = crypto::generate_staff_key();
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let key = StaffKeys::new(&mut conn)
        .create(&StaffKeyCreateDBRequest {
            club_id: None,
            name: "test platform key".to_string(),
            secret: secret.clone(),
        })
        .await
        .expect("Failed to create platform key");
    (key, secret)
}

pub async fn create_test_club(pool: &PgPool) -> Club {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Clubs::new(&mut conn)
        .create(&ClubCreateDBRequest {
            name: "Test Club".to_string(),
            slug: format!("test-club-{}", Uuid::new_v4().simple()),
            whatsapp_group_id: None,
        })
        .await
        .expect("Failed to create test club")
}

pub async fn create_club_key(pool: &PgPool, club_id: ClubId) -> (StaffKey, String) {
    let secret = crypto::generate_staff_key();
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let key = StaffKeys::new(&mut conn)
        .create(&StaffKeyCreateDBRequest {
            club_id: Some(club_id),
            name: "test club key".to_string(),
            secret: secret.clone(),
        })
        .await
        .expect("Failed to create club key");
    (key, secret)
}

pub async fn create_test_student(pool: &PgPool, club_id: ClubId) -> Student {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let marker = Uuid::new_v4().simple();
    Students::new(&mut conn)
        .create(&StudentCreateDBRequest {
            club_id,
            name: format!("Student {marker}"),
            email: format!("student_{marker}@example.com"),
            phone: None,
            level: None,
        })
        .await
        .expect("Failed to create test student")
}

pub async fn create_test_class(pool: &PgPool, club_id: ClubId, max_participants: i32) -> ProgrammedClass {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Classes::new(&mut conn)
        .create(&ClassCreateDBRequest {
            club_id,
            trainer_id: None,
            name: "Evening Padel".to_string(),
            max_participants,
            day_of_week: 0,
            start_time: chrono::NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            duration_minutes: 60,
            level: None,
        })
        .await
        .expect("Failed to create test class")
}

pub async fn enroll(pool: &PgPool, class_id: ClassId, student_id: StudentId) -> ClassParticipant {
    participants::claim_spot(pool, class_id, student_id)
        .await
        .expect("Failed to enroll test participant")
}

pub async fn join_waitlist(pool: &PgPool, class_id: ClassId, student_id: StudentId) -> WaitlistEntry {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Waitlist::new(&mut conn)
        .join(class_id, student_id)
        .await
        .expect("Failed to join test waitlist")
}

/// Force a notified entry's offer window into the past.
pub async fn expire_entry(pool: &PgPool, entry_id: crate::types::WaitlistEntryId) {
    sqlx::query("UPDATE waitlist_entries SET expires_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(entry_id)
        .execute(pool)
        .await
        .expect("Failed to expire test entry");
}

/// Backdate every enrollment token for a class so the sweep cooldown no
/// longer suppresses it.
pub async fn age_tokens(pool: &PgPool, class_id: ClassId) {
    sqlx::query("UPDATE enrollment_tokens SET created_at = NOW() - INTERVAL '1 day' WHERE class_id = $1")
        .bind(class_id)
        .execute(pool)
        .await
        .expect("Failed to age test tokens");
}
