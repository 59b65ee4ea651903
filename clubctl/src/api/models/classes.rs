//! API models for class management and the bulk schedule generator.

use chrono::NaiveTime;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::types::{StudentId, TrainerId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClassCreate {
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Option<Uuid>)]
    pub trainer_id: Option<TrainerId>,
    pub max_participants: i32,
    /// 0 = Monday through 6 = Sunday
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ClassUpdate {
    pub name: Option<String>,
    #[schema(value_type = Option<Uuid>)]
    pub trainer_id: Option<TrainerId>,
    pub max_participants: Option<i32>,
    pub level: Option<String>,
}

/// One recurrence rule, expanded server-side into many weekly slots.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkClassCreate {
    /// Slot names become "{name_prefix} {weekday} {start_time}"
    pub name_prefix: String,
    #[serde(default)]
    #[schema(value_type = Option<Uuid>)]
    pub trainer_id: Option<TrainerId>,
    pub max_participants: i32,
    /// Days to generate slots for, 0 = Monday through 6 = Sunday
    pub days_of_week: Vec<i16>,
    /// Daily window the slots are laid out in
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    /// Slot length; also the step between consecutive slots
    pub slot_minutes: i32,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EnrollRequest {
    #[schema(value_type = Uuid)]
    pub student_id: StudentId,
}
