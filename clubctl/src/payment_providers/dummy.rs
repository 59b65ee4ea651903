//! Dummy payment provider implementation
//!
//! Settles every checkout instantly at a configured amount without calling
//! any external service. Used in development and tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    db::handlers::Payments,
    payment_providers::{settle_enrollment_payment, CheckoutContext, PaymentError, PaymentProvider, PaymentSession, Result, WebhookEvent},
};

pub struct DummyProvider {
    amount: Decimal,
}

impl DummyProvider {
    pub fn new(amount: Decimal) -> Self {
        Self { amount }
    }
}

#[async_trait]
impl PaymentProvider for DummyProvider {
    async fn create_checkout_session(
        &self,
        _db_pool: &PgPool,
        checkout: &CheckoutContext,
        _cancel_url: &str,
        success_url: &str,
    ) -> Result<String> {
        // Encode the participant id in the session id so
        // get_payment_session can recover it, mirroring what
        // client_reference_id does for real providers.
        let session_id = format!("dummy_session_{}_{}", checkout.participant_id, uuid::Uuid::new_v4());

        let redirect_url = success_url.replace("{CHECKOUT_SESSION_ID}", &session_id);

        tracing::info!(
            "Dummy provider created checkout session {} for participant {}",
            session_id,
            checkout.participant_id
        );

        Ok(redirect_url)
    }

    async fn get_payment_session(&self, session_id: &str) -> Result<PaymentSession> {
        // Format: dummy_session_{participant_id}_{uuid}
        let participant_id = session_id
            .strip_prefix("dummy_session_")
            .and_then(|rest| rest.split('_').next())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PaymentError::InvalidData("Invalid dummy session ID format".to_string()))?;

        Ok(PaymentSession {
            participant_id: participant_id.to_string(),
            amount: self.amount,
            is_paid: true, // Dummy sessions are always "paid"
        })
    }

    async fn process_payment_session(&self, db_pool: &PgPool, session_id: &str) -> Result<()> {
        let mut conn = db_pool.acquire().await?;
        let existing = Payments::new(&mut conn).get_by_source_id(session_id).await.map_err(PaymentError::from)?;
        drop(conn);

        if existing.is_some() {
            tracing::trace!("Payment for session {} already exists, skipping (fast path)", session_id);
            return Ok(());
        }

        let payment_session = self.get_payment_session(session_id).await?;

        settle_enrollment_payment(db_pool, &payment_session, session_id).await
    }

    async fn validate_webhook(&self, _headers: &axum::http::HeaderMap, _body: &str) -> Result<Option<WebhookEvent>> {
        // The dummy provider has no webhooks; sessions settle immediately.
        Ok(None)
    }

    async fn process_webhook_event(&self, _db_pool: &PgPool, _event: &WebhookEvent) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_session_id_roundtrip() {
        let provider = DummyProvider::new(Decimal::new(2500, 2));
        let participant_id = Uuid::new_v4();

        let checkout = CheckoutContext {
            participant_id,
            club_id: Uuid::new_v4(),
            student_email: "student@example.com".to_string(),
        };

        // The pool is unused by the dummy checkout path; connect lazily so
        // no database is needed.
        let pool = sqlx::postgres::PgPoolOptions::new().connect_lazy("postgres://localhost/unused").unwrap();

        let url = provider
            .create_checkout_session(&pool, &checkout, "https://x/cancel", "https://x/ok?session={CHECKOUT_SESSION_ID}")
            .await
            .unwrap();

        let session_id = url.split("session=").nth(1).unwrap();
        let session = provider.get_payment_session(session_id).await.unwrap();

        assert_eq!(session.participant_id, participant_id.to_string());
        assert!(session.is_paid);
        assert_eq!(session.amount, Decimal::new(2500, 2));
    }

    #[tokio::test]
    async fn test_malformed_session_ids_rejected() {
        let provider = DummyProvider::new(Decimal::new(2500, 2));

        assert!(provider.get_payment_session("cs_test_stripe_style").await.is_err());
        assert!(provider.get_payment_session("dummy_session_").await.is_err());
    }
}
