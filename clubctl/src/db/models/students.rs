//! Database models for students.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::EntityStatus;
use crate::types::{ClubId, StudentId};

#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct Student {
    #[schema(value_type = Uuid)]
    pub id: StudentId,
    #[schema(value_type = Uuid)]
    pub club_id: ClubId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Free-form skill level (e.g. "beginner", "open water")
    pub level: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StudentCreateDBRequest {
    pub club_id: ClubId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StudentUpdateDBRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub level: Option<String>,
}

pub type StudentDBResponse = Student;

#[derive(Debug, Clone)]
pub struct StudentFilter {
    pub club_id: ClubId,
    pub status: Option<EntityStatus>,
    pub skip: i64,
    pub limit: i64,
}
