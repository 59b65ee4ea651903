//! API models for club and staff-key management.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::staff_keys::StaffKey;
use crate::types::{ClubId, StaffKeyId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClubCreate {
    pub name: String,
    /// URL-safe identifier, unique across the platform
    pub slug: String,
    /// Club-specific messaging group; falls back to the global one when unset
    #[serde(default)]
    pub whatsapp_group_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ClubUpdate {
    pub name: Option<String>,
    pub whatsapp_group_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StaffKeyCreate {
    /// Display name for the key (e.g. "front desk tablet")
    pub name: String,
}

/// Returned exactly once at creation time; the secret is not retrievable
/// afterwards.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffKeyCreated {
    #[schema(value_type = Uuid)]
    pub id: StaffKeyId,
    #[schema(value_type = Option<Uuid>)]
    pub club_id: Option<ClubId>,
    pub name: String,
    pub secret: String,
}

impl From<StaffKey> for StaffKeyCreated {
    fn from(key: StaffKey) -> Self {
        Self {
            id: key.id,
            club_id: key.club_id,
            name: key.name,
            secret: key.secret,
        }
    }
}
