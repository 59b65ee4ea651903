//! League management handlers: leagues, teams, match results, standings.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::leagues::{LeagueCreate, MatchCreate, StandingsEntry, TeamCreate},
    auth::CurrentStaff,
    db::{
        errors::DbError,
        handlers::Leagues,
        models::leagues::{League, LeagueCreateDBRequest, LeagueMatch, LeagueTeam, MatchCreateDBRequest},
    },
    errors::Error,
    standings::{compute_standings, CompletedMatch},
    types::LeagueId,
    AppState,
};

fn not_found(id: LeagueId) -> Error {
    Error::NotFound {
        resource: "League".to_string(),
        id: id.to_string(),
    }
}

/// Fetch a league and enforce club scoping in one step.
async fn owned_league(conn: &mut sqlx::PgConnection, staff: &CurrentStaff, id: LeagueId) -> Result<League, Error> {
    let club_id = staff.require_club()?;
    Leagues::new(conn)
        .get_by_id(id)
        .await?
        .filter(|l| l.club_id == club_id)
        .ok_or_else(|| not_found(id))
}

// POST /leagues
pub async fn create_league(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Json(body): Json<LeagueCreate>,
) -> Result<(StatusCode, Json<League>), Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let league = Leagues::new(&mut conn)
        .create(&LeagueCreateDBRequest {
            club_id,
            name: body.name,
            season: body.season,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(league)))
}

// GET /leagues
pub async fn list_leagues(State(state): State<AppState>, staff: CurrentStaff) -> Result<Json<Vec<League>>, Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let leagues = Leagues::new(&mut conn).list_for_club(club_id).await?;

    Ok(Json(leagues))
}

// GET /leagues/:id
pub async fn get_league(State(state): State<AppState>, staff: CurrentStaff, Path(id): Path<LeagueId>) -> Result<Json<League>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let league = owned_league(&mut conn, &staff, id).await?;
    Ok(Json(league))
}

// DELETE /leagues/:id - archives the league
pub async fn delete_league(State(state): State<AppState>, staff: CurrentStaff, Path(id): Path<LeagueId>) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    owned_league(&mut conn, &staff, id).await?;

    Leagues::new(&mut conn).archive(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /leagues/:id/teams
pub async fn add_team(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<LeagueId>,
    Json(body): Json<TeamCreate>,
) -> Result<(StatusCode, Json<LeagueTeam>), Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    owned_league(&mut conn, &staff, id).await?;

    let team = Leagues::new(&mut conn).add_team(id, &body.name).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

// GET /leagues/:id/teams
pub async fn list_teams(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<LeagueId>,
) -> Result<Json<Vec<LeagueTeam>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    owned_league(&mut conn, &staff, id).await?;

    let teams = Leagues::new(&mut conn).list_teams(id).await?;
    Ok(Json(teams))
}

/// Record a completed match with set scores.
#[utoipa::path(
    post,
    path = "/leagues/{id}/matches",
    tag = "leagues",
    summary = "Record a match result",
    request_body = MatchCreate,
    responses(
        (status = 201, description = "Match recorded", body = LeagueMatch),
        (status = 400, description = "Teams invalid or no sets given"),
        (status = 404, description = "League not found"),
    ),
    security(("BearerAuth" = []))
)]
pub async fn record_match(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<LeagueId>,
    Json(body): Json<MatchCreate>,
) -> Result<(StatusCode, Json<LeagueMatch>), Error> {
    if body.sets.is_empty() {
        return Err(Error::BadRequest {
            message: "A match needs at least one set score".to_string(),
        });
    }
    if body.home_team_id == body.away_team_id {
        return Err(Error::BadRequest {
            message: "A team cannot play itself".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(DbError::from)?;
    owned_league(&mut tx, &staff, id).await?;

    let request = MatchCreateDBRequest {
        league_id: id,
        home_team_id: body.home_team_id,
        away_team_id: body.away_team_id,
        played_at: body.played_at,
        sets: body.sets.iter().map(|s| (s.home_games, s.away_games)).collect(),
    };

    let (league_match, _sets) = Leagues::new(&mut tx).record_match(&request).await.map_err(|e| match e {
        DbError::Other(inner) => Error::BadRequest {
            message: inner.to_string(),
        },
        other => other.into(),
    })?;
    tx.commit().await.map_err(DbError::from)?;

    Ok((StatusCode::CREATED, Json(league_match)))
}

// GET /leagues/:id/matches
pub async fn list_matches(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<LeagueId>,
) -> Result<Json<Vec<LeagueMatch>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    owned_league(&mut conn, &staff, id).await?;

    let matches = Leagues::new(&mut conn).list_matches(id).await?;
    Ok(Json(matches))
}

/// Current standings over the league's completed matches.
#[utoipa::path(
    get,
    path = "/leagues/{id}/standings",
    tag = "leagues",
    summary = "League standings",
    responses(
        (status = 200, description = "Sorted standings", body = [StandingsEntry]),
        (status = 404, description = "League not found"),
    ),
    security(("BearerAuth" = []))
)]
pub async fn get_standings(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<LeagueId>,
) -> Result<Json<Vec<StandingsEntry>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    owned_league(&mut conn, &staff, id).await?;

    let mut leagues = Leagues::new(&mut conn);
    let completed = leagues.list_completed_match_sets(id).await?;
    let teams = leagues.list_teams(id).await?;

    let matches: Vec<CompletedMatch> = completed
        .into_iter()
        .map(|(league_match, sets)| CompletedMatch {
            home_team: league_match.home_team_id,
            away_team: league_match.away_team_id,
            sets: sets.into_iter().map(|s| (s.home_games, s.away_games)).collect(),
        })
        .collect();

    let rows = compute_standings(&matches);

    let entries = rows
        .into_iter()
        .map(|row| {
            let team_name = teams
                .iter()
                .find(|t| t.id == row.team_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| row.team_id.to_string());
            StandingsEntry { team_name, row }
        })
        .collect();

    Ok(Json(entries))
}
