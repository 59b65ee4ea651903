//! Database models for class participants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{ClassId, ParticipantId, StudentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "participant_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Active,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "participant_payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantPaymentStatus {
    Pending,
    Paid,
    Waived,
}

/// Database entity model. The presence of `active` rows is what capacity
/// counts against.
#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct ClassParticipant {
    #[schema(value_type = Uuid)]
    pub id: ParticipantId,
    #[schema(value_type = Uuid)]
    pub class_id: ClassId,
    #[schema(value_type = Uuid)]
    pub student_id: StudentId,
    pub status: ParticipantStatus,
    pub payment_status: ParticipantPaymentStatus,
    pub joined_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

pub type ParticipantDBResponse = ClassParticipant;
