//! Payment provider abstraction layer
//!
//! This module defines the `PaymentProvider` trait which abstracts checkout
//! and webhook processing across payment providers (Stripe today, a dummy
//! implementation for development and tests). Payments here settle a class
//! enrollment: a successful checkout marks the participant's enrollment as
//! paid and records a `payments` row keyed by the provider's session id.

use async_trait::async_trait;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::PaymentConfig,
    db::handlers::{Classes, Participants, Payments, Repository},
    db::models::payments::PaymentCreateDBRequest,
    types::{ClubId, ParticipantId},
};

pub mod dummy;
pub mod stripe;

/// Create a payment provider from configuration
///
/// This is the single point where we convert config into provider instances.
/// Adding a new provider requires adding a match arm here.
pub fn create_provider(config: &PaymentConfig) -> Arc<dyn PaymentProvider> {
    match config {
        PaymentConfig::Stripe(stripe_config) => Arc::new(stripe::StripeProvider::new(stripe_config.clone())),
        PaymentConfig::Dummy(dummy_config) => Arc::new(dummy::DummyProvider::new(dummy_config.amount)),
    }
}

/// Result type for payment provider operations
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Errors that can occur during payment processing
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment provider API error: {0}")]
    ProviderApi(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Payment not completed yet")]
    PaymentNotCompleted,

    #[error("Invalid payment data: {0}")]
    InvalidData(String),

    #[error("Payment already processed")]
    AlreadyProcessed,
}

impl From<PaymentError> for StatusCode {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::PaymentNotCompleted => StatusCode::PAYMENT_REQUIRED,
            PaymentError::InvalidData(_) => StatusCode::BAD_REQUEST,
            PaymentError::AlreadyProcessed => StatusCode::OK,
            PaymentError::ProviderApi(_) | PaymentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<crate::db::errors::DbError> for PaymentError {
    fn from(err: crate::db::errors::DbError) -> Self {
        match err {
            // Duplicate source_id means a concurrent processor won the race;
            // treat as already-processed for idempotency.
            crate::db::errors::DbError::UniqueViolation { constraint, .. }
                if constraint.as_deref() == Some("payments_source_id_unique") =>
            {
                PaymentError::AlreadyProcessed
            }
            _ => PaymentError::InvalidData(format!("Database error: {}", err)),
        }
    }
}

/// What a checkout session is created for.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    pub participant_id: ParticipantId,
    pub club_id: ClubId,
    /// Email shown to the provider's checkout page
    pub student_email: String,
}

/// Represents a (possibly completed) payment session at the provider
#[derive(Debug, Clone)]
pub struct PaymentSession {
    /// Participant the enrollment payment is for (provider-side reference)
    pub participant_id: String,
    /// Amount paid, in major currency units
    pub amount: Decimal,
    /// Whether the payment has been completed
    pub is_paid: bool,
}

/// Represents a webhook event from a payment provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    /// Type of event (e.g., "checkout.session.completed")
    pub event_type: String,
    /// Session ID associated with this event, if applicable
    pub session_id: Option<String>,
}

/// Abstract payment provider interface
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a new checkout session.
    ///
    /// Returns a URL the student should be redirected to for payment.
    async fn create_checkout_session(&self, db_pool: &PgPool, checkout: &CheckoutContext, cancel_url: &str, success_url: &str)
        -> Result<String>;

    /// Retrieve and validate a payment session from the provider.
    async fn get_payment_session(&self, session_id: &str) -> Result<PaymentSession>;

    /// Process a completed payment session.
    ///
    /// Idempotent: processing the same session_id twice must not settle the
    /// enrollment twice.
    async fn process_payment_session(&self, db_pool: &PgPool, session_id: &str) -> Result<()>;

    /// Validate and extract a webhook event from raw request data.
    ///
    /// Returns None if this provider doesn't support webhooks.
    /// Returns Err if validation fails (invalid signature, malformed data).
    async fn validate_webhook(&self, headers: &axum::http::HeaderMap, body: &str) -> Result<Option<WebhookEvent>>;

    /// Process a validated webhook event. Idempotent like
    /// [`PaymentProvider::process_payment_session`].
    async fn process_webhook_event(&self, db_pool: &PgPool, event: &WebhookEvent) -> Result<()>;
}

/// Shared settlement path: record the payment and mark the enrollment paid.
///
/// The unique `payments.source_id` constraint is the idempotency anchor -
/// when two processors race, the loser's insert collapses into
/// `AlreadyProcessed`, which callers treat as success.
pub(crate) async fn settle_enrollment_payment(db_pool: &PgPool, session: &PaymentSession, session_id: &str) -> Result<()> {
    let participant_id: ParticipantId = session
        .participant_id
        .parse()
        .map_err(|e| PaymentError::InvalidData(format!("Invalid participant reference: {e}")))?;

    let mut conn = db_pool.acquire().await?;

    let participant = Participants::new(&mut conn)
        .get_by_id(participant_id)
        .await
        .map_err(PaymentError::from)?
        .ok_or_else(|| PaymentError::InvalidData(format!("Participant {participant_id} not found")))?;

    let class = Classes::new(&mut conn)
        .get_by_id(participant.class_id)
        .await
        .map_err(PaymentError::from)?
        .ok_or_else(|| PaymentError::InvalidData(format!("Class {} not found", participant.class_id)))?;

    let mut payments = Payments::new(&mut conn);
    let request = PaymentCreateDBRequest {
        club_id: class.club_id,
        participant_id,
        amount: session.amount,
        currency: "USD".to_string(),
        source_id: session_id.to_string(),
    };

    match payments.create(&request).await {
        Ok(_) => {}
        Err(e) => match PaymentError::from(e) {
            PaymentError::AlreadyProcessed => {
                tracing::trace!("Payment for session {} already recorded (caught unique violation)", session_id);
                return Ok(());
            }
            other => return Err(other),
        },
    }

    payments.mark_paid(session_id).await.map_err(PaymentError::from)?;
    Participants::new(&mut conn).mark_paid(participant_id).await.map_err(PaymentError::from)?;

    tracing::info!("Settled enrollment payment for participant {} (session {})", participant_id, session_id);

    Ok(())
}
