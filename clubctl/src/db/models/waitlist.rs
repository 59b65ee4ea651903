//! Database models for waitlist entries.
//!
//! Status transitions are one-directional:
//!
//! ```text
//! waiting ──► notified ──► accepted
//!                   └─────► skipped   (declined or timed out)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{ClassId, EnrollmentTokenId, StudentId, WaitlistEntryId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "waitlist_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WaitlistStatus {
    Waiting,
    Notified,
    Accepted,
    Skipped,
}

impl WaitlistStatus {
    /// Terminal states can never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WaitlistStatus::Accepted | WaitlistStatus::Skipped)
    }
}

/// Database entity model
#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct WaitlistEntry {
    #[schema(value_type = Uuid)]
    pub id: WaitlistEntryId,
    #[schema(value_type = Uuid)]
    pub class_id: ClassId,
    #[schema(value_type = Uuid)]
    pub student_id: StudentId,
    pub status: WaitlistStatus,
    pub position: i32,
    pub joined_at: DateTime<Utc>,
    pub notified_at: Option<DateTime<Utc>>,
    /// Offer deadline, set when the entry is promoted to `notified`
    pub expires_at: Option<DateTime<Utc>>,
    pub token_id: Option<EnrollmentTokenId>,
}

impl WaitlistEntry {
    /// Whether a notified entry's offer window has lapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }
}

pub type WaitlistEntryDBResponse = WaitlistEntry;
