//! Stripe payment provider implementation

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use stripe::{CheckoutSession, CheckoutSessionMode, CheckoutSessionPaymentStatus, Client, CreateCheckoutSession, CreateCheckoutSessionLineItems};

use crate::{
    config::StripeConfig,
    db::handlers::Payments,
    payment_providers::{settle_enrollment_payment, CheckoutContext, PaymentError, PaymentProvider, PaymentSession, Result, WebhookEvent},
};

/// Stripe payment provider
pub struct StripeProvider {
    config: StripeConfig,
}

impl StripeProvider {
    pub fn new(config: StripeConfig) -> Self {
        Self { config }
    }

    fn client(&self) -> Client {
        Client::new(&self.config.api_key)
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    async fn create_checkout_session(
        &self,
        _db_pool: &PgPool,
        checkout: &CheckoutContext,
        cancel_url: &str,
        success_url: &str,
    ) -> Result<String> {
        let client = self.client();

        let participant_reference = checkout.participant_id.to_string();
        let checkout_params = CreateCheckoutSession {
            cancel_url: Some(cancel_url),
            success_url: Some(success_url),
            client_reference_id: Some(&participant_reference),
            currency: Some(stripe::Currency::USD),
            customer_email: Some(&checkout.student_email),
            line_items: Some(vec![CreateCheckoutSessionLineItems {
                price: Some(self.config.price_id.clone()),
                quantity: Some(1),
                ..Default::default()
            }]),
            mode: Some(CheckoutSessionMode::Payment),
            expand: &["line_items"],
            ..Default::default()
        };

        let checkout_session = CheckoutSession::create(&client, checkout_params).await.map_err(|e| {
            tracing::error!("Failed to create Stripe checkout session: {:?}", e);
            PaymentError::ProviderApi(e.to_string())
        })?;

        tracing::info!(
            "Created checkout session {} for participant {}",
            checkout_session.id,
            checkout.participant_id
        );

        // Return checkout URL for hosted checkout
        checkout_session.url.ok_or_else(|| {
            tracing::error!("Checkout session missing URL");
            PaymentError::ProviderApi("Checkout session missing URL".to_string())
        })
    }

    async fn get_payment_session(&self, session_id: &str) -> Result<PaymentSession> {
        let client = self.client();

        let session_id: stripe::CheckoutSessionId = session_id
            .parse()
            .map_err(|_| PaymentError::InvalidData("Invalid Stripe session ID".to_string()))?;

        let checkout_session = CheckoutSession::retrieve(&client, &session_id, &["line_items"])
            .await
            .map_err(|e| {
                tracing::error!("Failed to retrieve Stripe checkout session: {:?}", e);
                PaymentError::ProviderApi(e.to_string())
            })?;

        let participant_id = checkout_session.client_reference_id.ok_or_else(|| {
            tracing::error!("Checkout session missing client_reference_id");
            PaymentError::InvalidData("Missing client_reference_id".to_string())
        })?;

        // Amounts come back in cents
        let amount_cents = checkout_session
            .line_items
            .and_then(|items| items.data.first().map(|item| item.amount_total))
            .or(checkout_session.amount_total)
            .ok_or_else(|| {
                tracing::error!("Checkout session missing both line_items and amount_total");
                PaymentError::InvalidData("Missing payment amount".to_string())
            })?;

        Ok(PaymentSession {
            participant_id,
            amount: Decimal::new(amount_cents, 2),
            is_paid: checkout_session.payment_status == CheckoutSessionPaymentStatus::Paid,
        })
    }

    async fn process_payment_session(&self, db_pool: &PgPool, session_id: &str) -> Result<()> {
        // Fast path: skip the Stripe API round trip when the payment is
        // already recorded (duplicate webhook deliveries, user retries).
        let mut conn = db_pool.acquire().await?;
        let existing = Payments::new(&mut conn).get_by_source_id(session_id).await.map_err(PaymentError::from)?;
        drop(conn);

        if existing.is_some() {
            tracing::trace!("Payment for session {} already exists, skipping (fast path)", session_id);
            return Ok(());
        }

        let payment_session = self.get_payment_session(session_id).await?;

        if !payment_session.is_paid {
            tracing::trace!("Session {} has not been paid, skipping.", session_id);
            return Err(PaymentError::PaymentNotCompleted);
        }

        settle_enrollment_payment(db_pool, &payment_session, session_id).await
    }

    async fn validate_webhook(&self, headers: &axum::http::HeaderMap, body: &str) -> Result<Option<WebhookEvent>> {
        let signature = headers
            .get("stripe-signature")
            .ok_or_else(|| {
                tracing::error!("Missing stripe-signature header");
                PaymentError::InvalidData("Missing stripe-signature header".to_string())
            })?
            .to_str()
            .map_err(|e| {
                tracing::error!("Invalid stripe-signature header: {:?}", e);
                PaymentError::InvalidData("Invalid stripe-signature header".to_string())
            })?;

        let event = stripe::Webhook::construct_event(body, signature, &self.config.webhook_secret).map_err(|e| {
            tracing::error!("Failed to construct webhook event: {:?}", e);
            PaymentError::InvalidData(format!("Webhook validation failed: {}", e))
        })?;

        tracing::trace!("Validated Stripe webhook event: {:?}", event.type_);

        let session_id = match &event.data.object {
            stripe::EventObject::CheckoutSession(session) => Some(session.id.to_string()),
            _ => None,
        };

        Ok(Some(WebhookEvent {
            event_type: format!("{:?}", event.type_),
            session_id,
        }))
    }

    async fn process_webhook_event(&self, db_pool: &PgPool, event: &WebhookEvent) -> Result<()> {
        // Only checkout completion events settle enrollments
        if event.event_type != "CheckoutSessionCompleted" && event.event_type != "CheckoutSessionAsyncPaymentSucceeded" {
            tracing::debug!("Ignoring webhook event type: {}", event.event_type);
            return Ok(());
        }

        let session_id = event.session_id.as_ref().ok_or_else(|| {
            tracing::error!("Webhook event missing session_id");
            PaymentError::InvalidData("Missing session_id in webhook event".to_string())
        })?;

        self.process_payment_session(db_pool, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_event_shape() {
        let event = WebhookEvent {
            event_type: "CheckoutSessionCompleted".to_string(),
            session_id: Some("cs_test_123".to_string()),
        };

        assert_eq!(event.event_type, "CheckoutSessionCompleted");
        assert_eq!(event.session_id.as_deref(), Some("cs_test_123"));
    }

    #[test]
    fn test_cents_convert_to_major_units() {
        // 2500 cents -> 25.00
        assert_eq!(Decimal::new(2500, 2), "25.00".parse::<Decimal>().unwrap());
    }
}
