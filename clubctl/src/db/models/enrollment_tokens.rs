//! Database models for enrollment tokens.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{ClassId, EnrollmentTokenId};

/// Database entity model.
///
/// A token records one spot offer: which class, how many spots were free at
/// notification time, and until when the offer can be claimed. The newest
/// token per class is also the sweep's re-notification de-duplication probe.
#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct EnrollmentToken {
    #[schema(value_type = Uuid)]
    pub id: EnrollmentTokenId,
    #[schema(value_type = Uuid)]
    pub class_id: ClassId,
    #[serde(skip_serializing)]
    pub secret: String,
    pub available_spots: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct EnrollmentTokenCreateDBRequest {
    pub class_id: ClassId,
    pub secret: String,
    pub available_spots: i32,
    pub expires_at: DateTime<Utc>,
}
