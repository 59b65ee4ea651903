//! Database models for clubs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::ClubId;

/// Database entity model
#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct Club {
    #[schema(value_type = Uuid)]
    pub id: ClubId,
    pub name: String,
    pub slug: String,
    /// Overrides the globally configured messaging group when set
    pub whatsapp_group_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ClubCreateDBRequest {
    pub name: String,
    pub slug: String,
    pub whatsapp_group_id: Option<String>,
}

/// Fields set to `None` are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ClubUpdateDBRequest {
    pub name: Option<String>,
    pub whatsapp_group_id: Option<String>,
}

pub type ClubDBResponse = Club;

#[derive(Debug, Clone)]
pub struct ClubFilter {
    pub skip: i64,
    pub limit: i64,
}

impl Default for ClubFilter {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}
