//! Common type definitions.
//!
//! All entity identifiers are UUIDs wrapped in type aliases so signatures
//! say what they take.

use uuid::Uuid;

pub type ClubId = Uuid;
pub type StaffKeyId = Uuid;
pub type TrainerId = Uuid;
pub type StudentId = Uuid;
pub type ClassId = Uuid;
pub type ParticipantId = Uuid;
pub type WaitlistEntryId = Uuid;
pub type EnrollmentTokenId = Uuid;
pub type PaymentId = Uuid;
pub type LeagueId = Uuid;
pub type TeamId = Uuid;
pub type MatchId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces.
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
