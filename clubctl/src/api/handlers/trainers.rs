//! Trainer management handlers (club-scoped).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        pagination::PaginationQuery,
        trainers::{TrainerCreate, TrainerUpdate},
    },
    auth::CurrentStaff,
    db::{
        errors::DbError,
        handlers::{Repository, Trainers},
        models::trainers::{Trainer, TrainerCreateDBRequest, TrainerFilter, TrainerUpdateDBRequest},
    },
    errors::Error,
    types::TrainerId,
    AppState,
};

fn not_found(id: TrainerId) -> Error {
    Error::NotFound {
        resource: "Trainer".to_string(),
        id: id.to_string(),
    }
}

// POST /trainers
pub async fn create_trainer(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Json(body): Json<TrainerCreate>,
) -> Result<(StatusCode, Json<Trainer>), Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let trainer = Trainers::new(&mut conn)
        .create(&TrainerCreateDBRequest {
            club_id,
            name: body.name,
            email: body.email,
            phone: body.phone,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(trainer)))
}

// GET /trainers
pub async fn list_trainers(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<Trainer>>, Error> {
    let club_id = staff.require_club()?;

    let (skip, limit) = pagination.clamped();
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let trainers = Trainers::new(&mut conn)
        .list(&TrainerFilter {
            club_id,
            status: None,
            skip,
            limit,
        })
        .await?;

    Ok(Json(trainers))
}

// GET /trainers/:id
pub async fn get_trainer(State(state): State<AppState>, staff: CurrentStaff, Path(id): Path<TrainerId>) -> Result<Json<Trainer>, Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let trainer = Trainers::new(&mut conn)
        .get_by_id(id)
        .await?
        .filter(|t| t.club_id == club_id)
        .ok_or_else(|| not_found(id))?;

    Ok(Json(trainer))
}

// PATCH /trainers/:id
pub async fn update_trainer(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<TrainerId>,
    Json(body): Json<TrainerUpdate>,
) -> Result<Json<Trainer>, Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut trainers = Trainers::new(&mut conn);

    trainers.get_by_id(id).await?.filter(|t| t.club_id == club_id).ok_or_else(|| not_found(id))?;

    let trainer = trainers
        .update(
            id,
            &TrainerUpdateDBRequest {
                name: body.name,
                email: body.email,
                phone: body.phone,
            },
        )
        .await?;

    Ok(Json(trainer))
}

// DELETE /trainers/:id - archives the trainer
pub async fn delete_trainer(State(state): State<AppState>, staff: CurrentStaff, Path(id): Path<TrainerId>) -> Result<StatusCode, Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut trainers = Trainers::new(&mut conn);

    trainers.get_by_id(id).await?.filter(|t| t.club_id == club_id).ok_or_else(|| not_found(id))?;

    trainers.archive(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
