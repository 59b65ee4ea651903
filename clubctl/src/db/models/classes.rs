//! Database models for programmed classes.
//!
//! A programmed class is a single weekly slot: a day of the week, a start
//! time, and a duration. The bulk schedule generator creates many of these
//! from one recurrence rule.

use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::EntityStatus;
use crate::types::{ClassId, ClubId, TrainerId};

/// Database entity model. `day_of_week` is 0 = Monday through 6 = Sunday.
#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct ProgrammedClass {
    #[schema(value_type = Uuid)]
    pub id: ClassId,
    #[schema(value_type = Uuid)]
    pub club_id: ClubId,
    #[schema(value_type = Option<Uuid>)]
    pub trainer_id: Option<TrainerId>,
    pub name: String,
    pub max_participants: i32,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub level: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgrammedClass {
    /// Human-readable weekday name for message templates.
    pub fn weekday_name(&self) -> &'static str {
        match self.day_of_week {
            0 => "Monday",
            1 => "Tuesday",
            2 => "Wednesday",
            3 => "Thursday",
            4 => "Friday",
            5 => "Saturday",
            _ => "Sunday",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassCreateDBRequest {
    pub club_id: ClubId,
    pub trainer_id: Option<TrainerId>,
    pub name: String,
    pub max_participants: i32,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassUpdateDBRequest {
    pub name: Option<String>,
    pub trainer_id: Option<TrainerId>,
    pub max_participants: Option<i32>,
    pub level: Option<String>,
}

pub type ClassDBResponse = ProgrammedClass;

#[derive(Debug, Clone)]
pub struct ClassFilter {
    pub club_id: ClubId,
    pub status: Option<EntityStatus>,
    pub skip: i64,
    pub limit: i64,
}
