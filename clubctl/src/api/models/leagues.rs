//! API models for league management and standings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::standings::StandingsRow;
use crate::types::TeamId;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeagueCreate {
    pub name: String,
    #[serde(default)]
    pub season: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TeamCreate {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetScoreBody {
    pub home_games: i16,
    pub away_games: i16,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MatchCreate {
    #[schema(value_type = Uuid)]
    pub home_team_id: TeamId,
    #[schema(value_type = Uuid)]
    pub away_team_id: TeamId,
    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,
    /// Ordered set scores; at least one set is required
    pub sets: Vec<SetScoreBody>,
}

/// A standings row enriched with the team's display name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingsEntry {
    pub team_name: String,
    #[serde(flatten)]
    pub row: StandingsRow,
}
