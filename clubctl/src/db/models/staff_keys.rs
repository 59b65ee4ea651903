//! Database models for staff API keys.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{ClubId, StaffKeyId};

/// Database entity model.
///
/// A key with `club_id = None` is a platform key: it can manage clubs and
/// mint club-scoped keys. Club keys are restricted to their own club.
#[derive(Debug, Clone, FromRow)]
pub struct StaffKey {
    pub id: StaffKeyId,
    pub club_id: Option<ClubId>,
    pub name: String,
    pub secret: String,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct StaffKeyCreateDBRequest {
    pub club_id: Option<ClubId>,
    pub name: String,
    pub secret: String,
}

pub type StaffKeyDBResponse = StaffKey;
