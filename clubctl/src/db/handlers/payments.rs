//! Database repository for payments.

use chrono::Utc;
use sqlx::PgConnection;
use tracing::instrument;

use crate::db::{
    errors::Result,
    models::payments::{Payment, PaymentCreateDBRequest},
};

pub struct Payments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Payments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Record a pending payment for a checkout session. The unique
    /// `source_id` constraint makes duplicate creation a `UniqueViolation`,
    /// which the payment providers treat as already-processed.
    #[instrument(skip(self, request), fields(source_id = %request.source_id), err)]
    pub async fn create(&mut self, request: &PaymentCreateDBRequest) -> Result<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (club_id, participant_id, amount, currency, source_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.club_id)
        .bind(request.participant_id)
        .bind(request.amount)
        .bind(&request.currency)
        .bind(&request.source_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(payment)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_source_id(&mut self, source_id: &str) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE source_id = $1")
            .bind(source_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(payment)
    }

    /// Settle a pending payment. Returns the updated row, or `None` if the
    /// payment was already settled (idempotent processing).
    #[instrument(skip(self), err)]
    pub async fn mark_paid(&mut self, source_id: &str) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status = 'paid', paid_at = $2 WHERE source_id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(source_id)
        .bind(Utc::now())
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(payment)
    }
}
