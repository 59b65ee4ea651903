//! Database models for payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{ClubId, ParticipantId, PaymentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "payment_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Pending,
    Paid,
}

/// Database entity model. `source_id` is the provider's checkout session id
/// and carries a unique constraint - the idempotency anchor for webhook
/// redelivery and manual re-processing.
#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct Payment {
    #[schema(value_type = Uuid)]
    pub id: PaymentId,
    #[schema(value_type = Uuid)]
    pub club_id: ClubId,
    #[schema(value_type = Uuid)]
    pub participant_id: ParticipantId,
    pub amount: Decimal,
    pub currency: String,
    pub source_id: String,
    pub status: PaymentState,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct PaymentCreateDBRequest {
    pub club_id: ClubId,
    pub participant_id: ParticipantId,
    pub amount: Decimal,
    pub currency: String,
    pub source_id: String,
}
