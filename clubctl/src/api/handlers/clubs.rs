//! Club and staff-key management handlers (platform keys only).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        clubs::{ClubCreate, ClubUpdate, StaffKeyCreate, StaffKeyCreated},
        pagination::PaginationQuery,
    },
    auth::CurrentStaff,
    crypto,
    db::{
        errors::DbError,
        handlers::{Clubs, Repository, StaffKeys},
        models::{
            clubs::{Club, ClubCreateDBRequest, ClubFilter, ClubUpdateDBRequest},
            staff_keys::StaffKeyCreateDBRequest,
        },
    },
    errors::Error,
    types::{ClubId, StaffKeyId},
    AppState,
};

// POST /clubs - Create a new club
pub async fn create_club(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Json(body): Json<ClubCreate>,
) -> Result<(StatusCode, Json<Club>), Error> {
    staff.require_platform()?;

    if body.slug.is_empty() || !body.slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(Error::BadRequest {
            message: "Slug must be non-empty lowercase ASCII, digits, and dashes".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let club = Clubs::new(&mut conn)
        .create(&ClubCreateDBRequest {
            name: body.name,
            slug: body.slug,
            whatsapp_group_id: body.whatsapp_group_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(club)))
}

// GET /clubs - List clubs
pub async fn list_clubs(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<Club>>, Error> {
    staff.require_platform()?;

    let (skip, limit) = pagination.clamped();
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let clubs = Clubs::new(&mut conn).list(&ClubFilter { skip, limit }).await?;

    Ok(Json(clubs))
}

// GET /clubs/:id - Get a club (platform keys, or the club's own key)
pub async fn get_club(State(state): State<AppState>, staff: CurrentStaff, Path(id): Path<ClubId>) -> Result<Json<Club>, Error> {
    if !staff.is_platform() && staff.club_id != Some(id) {
        return Err(Error::NotFound {
            resource: "Club".to_string(),
            id: id.to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let club = Clubs::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Club".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(club))
}

// PATCH /clubs/:id - Update a club
pub async fn update_club(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<ClubId>,
    Json(body): Json<ClubUpdate>,
) -> Result<Json<Club>, Error> {
    if !staff.is_platform() && staff.club_id != Some(id) {
        return Err(Error::NotFound {
            resource: "Club".to_string(),
            id: id.to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut clubs = Clubs::new(&mut conn);

    if clubs.get_by_id(id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Club".to_string(),
            id: id.to_string(),
        });
    }

    let club = clubs
        .update(
            id,
            &ClubUpdateDBRequest {
                name: body.name,
                whatsapp_group_id: body.whatsapp_group_id,
            },
        )
        .await?;

    Ok(Json(club))
}

// DELETE /clubs/:id - Delete a club and everything in it
pub async fn delete_club(State(state): State<AppState>, staff: CurrentStaff, Path(id): Path<ClubId>) -> Result<StatusCode, Error> {
    staff.require_platform()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Clubs::new(&mut conn).delete(id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Club".to_string(),
            id: id.to_string(),
        })
    }
}

// POST /clubs/:id/keys - Mint a staff key scoped to a club
pub async fn create_club_key(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<ClubId>,
    Json(body): Json<StaffKeyCreate>,
) -> Result<(StatusCode, Json<StaffKeyCreated>), Error> {
    staff.require_platform()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    if Clubs::new(&mut conn).get_by_id(id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Club".to_string(),
            id: id.to_string(),
        });
    }

    let key = StaffKeys::new(&mut conn)
        .create(&StaffKeyCreateDBRequest {
            club_id: Some(id),
            name: body.name,
            secret: crypto::generate_staff_key(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(key.into())))
}

// DELETE /keys/:id - Revoke a staff key
pub async fn revoke_key(State(state): State<AppState>, staff: CurrentStaff, Path(id): Path<StaffKeyId>) -> Result<StatusCode, Error> {
    staff.require_platform()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let revoked = StaffKeys::new(&mut conn).revoke(id).await?;

    if revoked {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Staff key".to_string(),
            id: id.to_string(),
        })
    }
}
