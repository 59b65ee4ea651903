//! Database record structures matching table schemas.

pub mod classes;
pub mod clubs;
pub mod enrollment_tokens;
pub mod leagues;
pub mod participants;
pub mod payments;
pub mod staff_keys;
pub mod students;
pub mod trainers;
pub mod waitlist;

use serde::{Deserialize, Serialize};

/// Lifecycle state shared by archivable entities (trainers, students,
/// classes, leagues). Archival replaces deletion so history stays intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "entity_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Archived,
}
