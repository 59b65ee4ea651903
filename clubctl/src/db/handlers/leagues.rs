//! Database repository for leagues, teams, and matches.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        models::leagues::{League, LeagueCreateDBRequest, LeagueMatch, LeagueTeam, MatchCreateDBRequest, MatchSet},
    },
    types::{abbrev_uuid, LeagueId, MatchId},
};

pub struct Leagues<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Leagues<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn create(&mut self, request: &LeagueCreateDBRequest) -> Result<League> {
        let league = sqlx::query_as::<_, League>(
            r#"
            INSERT INTO leagues (club_id, name, season)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(request.club_id)
        .bind(&request.name)
        .bind(&request.season)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(league)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: LeagueId) -> Result<Option<League>> {
        let league = sqlx::query_as::<_, League>("SELECT * FROM leagues WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(league)
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_club(&mut self, club_id: crate::types::ClubId) -> Result<Vec<League>> {
        let leagues = sqlx::query_as::<_, League>("SELECT * FROM leagues WHERE club_id = $1 ORDER BY created_at DESC")
            .bind(club_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(leagues)
    }

    #[instrument(skip(self), err)]
    pub async fn archive(&mut self, id: LeagueId) -> Result<bool> {
        let result = sqlx::query("UPDATE leagues SET status = 'archived', updated_at = NOW() WHERE id = $1 AND status = 'active'")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(league_id = %abbrev_uuid(&league_id)), err)]
    pub async fn add_team(&mut self, league_id: LeagueId, name: &str) -> Result<LeagueTeam> {
        let team = sqlx::query_as::<_, LeagueTeam>(
            r#"
            INSERT INTO league_teams (league_id, name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(league_id)
        .bind(name)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(team)
    }

    #[instrument(skip(self), err)]
    pub async fn list_teams(&mut self, league_id: LeagueId) -> Result<Vec<LeagueTeam>> {
        let teams = sqlx::query_as::<_, LeagueTeam>("SELECT * FROM league_teams WHERE league_id = $1 ORDER BY name")
            .bind(league_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(teams)
    }

    /// Record a completed match with its set scores in one shot. Both teams
    /// must belong to the league; the insert's FK + league check enforce it.
    #[instrument(skip(self, request), fields(league_id = %abbrev_uuid(&request.league_id)), err)]
    pub async fn record_match(&mut self, request: &MatchCreateDBRequest) -> Result<(LeagueMatch, Vec<MatchSet>)> {
        // Verify both teams are in this league before writing anything.
        let team_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM league_teams WHERE league_id = $1 AND id = ANY($2)")
            .bind(request.league_id)
            .bind(vec![request.home_team_id, request.away_team_id])
            .fetch_one(&mut *self.db)
            .await?;

        if team_count != 2 {
            return Err(DbError::Other(anyhow::anyhow!(
                "both teams must belong to league {}",
                request.league_id
            )));
        }

        let league_match = sqlx::query_as::<_, LeagueMatch>(
            r#"
            INSERT INTO league_matches (league_id, home_team_id, away_team_id, status, played_at)
            VALUES ($1, $2, $3, 'completed', COALESCE($4, NOW()))
            RETURNING *
            "#,
        )
        .bind(request.league_id)
        .bind(request.home_team_id)
        .bind(request.away_team_id)
        .bind(request.played_at)
        .fetch_one(&mut *self.db)
        .await?;

        let mut sets = Vec::with_capacity(request.sets.len());
        for (i, (home_games, away_games)) in request.sets.iter().enumerate() {
            let set = sqlx::query_as::<_, MatchSet>(
                r#"
                INSERT INTO match_sets (match_id, set_number, home_games, away_games)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(league_match.id)
            .bind((i + 1) as i16)
            .bind(home_games)
            .bind(away_games)
            .fetch_one(&mut *self.db)
            .await?;
            sets.push(set);
        }

        Ok((league_match, sets))
    }

    #[instrument(skip(self), err)]
    pub async fn list_matches(&mut self, league_id: LeagueId) -> Result<Vec<LeagueMatch>> {
        let matches = sqlx::query_as::<_, LeagueMatch>("SELECT * FROM league_matches WHERE league_id = $1 ORDER BY created_at")
            .bind(league_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(matches)
    }

    /// All sets for a league's completed matches, keyed for the standings
    /// aggregation.
    #[instrument(skip(self), err)]
    pub async fn list_completed_match_sets(&mut self, league_id: LeagueId) -> Result<Vec<(LeagueMatch, Vec<MatchSet>)>> {
        let matches = sqlx::query_as::<_, LeagueMatch>(
            "SELECT * FROM league_matches WHERE league_id = $1 AND status = 'completed' ORDER BY created_at",
        )
        .bind(league_id)
        .fetch_all(&mut *self.db)
        .await?;

        let match_ids: Vec<MatchId> = matches.iter().map(|m| m.id).collect();
        let all_sets = sqlx::query_as::<_, MatchSet>("SELECT * FROM match_sets WHERE match_id = ANY($1) ORDER BY match_id, set_number")
            .bind(&match_ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result = Vec::with_capacity(matches.len());
        for league_match in matches {
            let sets = all_sets.iter().filter(|s| s.match_id == league_match.id).cloned().collect();
            result.push((league_match, sets));
        }

        Ok(result)
    }
}
