//! Database models for leagues, teams, and matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::EntityStatus;
use crate::types::{ClubId, LeagueId, MatchId, TeamId};

#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct League {
    #[schema(value_type = Uuid)]
    pub id: LeagueId,
    #[schema(value_type = Uuid)]
    pub club_id: ClubId,
    pub name: String,
    pub season: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LeagueCreateDBRequest {
    pub club_id: ClubId,
    pub name: String,
    pub season: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct LeagueTeam {
    #[schema(value_type = Uuid)]
    pub id: TeamId,
    #[schema(value_type = Uuid)]
    pub league_id: LeagueId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Completed,
}

#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct LeagueMatch {
    #[schema(value_type = Uuid)]
    pub id: MatchId,
    #[schema(value_type = Uuid)]
    pub league_id: LeagueId,
    #[schema(value_type = Uuid)]
    pub home_team_id: TeamId,
    #[schema(value_type = Uuid)]
    pub away_team_id: TeamId,
    pub status: MatchStatus,
    pub played_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One set of a match, games won per side.
#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct MatchSet {
    #[schema(value_type = Uuid)]
    pub match_id: MatchId,
    pub set_number: i16,
    pub home_games: i16,
    pub away_games: i16,
}

#[derive(Debug, Clone)]
pub struct MatchCreateDBRequest {
    pub league_id: LeagueId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub played_at: Option<DateTime<Utc>>,
    /// Ordered set scores as (home_games, away_games)
    pub sets: Vec<(i16, i16)>,
}
