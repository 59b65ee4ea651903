//! Database models for trainers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::EntityStatus;
use crate::types::{ClubId, TrainerId};

#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct Trainer {
    #[schema(value_type = Uuid)]
    pub id: TrainerId,
    #[schema(value_type = Uuid)]
    pub club_id: ClubId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TrainerCreateDBRequest {
    pub club_id: ClubId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TrainerUpdateDBRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub type TrainerDBResponse = Trainer;

#[derive(Debug, Clone)]
pub struct TrainerFilter {
    pub club_id: ClubId,
    pub status: Option<EntityStatus>,
    pub skip: i64,
    pub limit: i64,
}
