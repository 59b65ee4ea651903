//! Class management handlers: CRUD, the bulk schedule generator, and
//! enrollment (the staff-facing side of the capacity invariant).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        classes::{BulkClassCreate, ClassCreate, ClassUpdate, EnrollRequest},
        pagination::PaginationQuery,
    },
    auth::CurrentStaff,
    db::{
        errors::DbError,
        handlers::{participants, Classes, Participants, Repository, Students},
        models::{
            classes::{ClassCreateDBRequest, ClassFilter, ClassUpdateDBRequest, ProgrammedClass},
            participants::ClassParticipant,
            EntityStatus,
        },
    },
    errors::Error,
    schedule,
    types::{ClassId, ParticipantId},
    AppState,
};

fn not_found(id: ClassId) -> Error {
    Error::NotFound {
        resource: "Class".to_string(),
        id: id.to_string(),
    }
}

/// Fetch a class and enforce club scoping in one step.
async fn owned_class(conn: &mut sqlx::PgConnection, staff: &CurrentStaff, id: ClassId) -> Result<ProgrammedClass, Error> {
    let club_id = staff.require_club()?;
    Classes::new(conn)
        .get_by_id(id)
        .await?
        .filter(|c| c.club_id == club_id)
        .ok_or_else(|| not_found(id))
}

// POST /classes
pub async fn create_class(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Json(body): Json<ClassCreate>,
) -> Result<(StatusCode, Json<ProgrammedClass>), Error> {
    let club_id = staff.require_club()?;

    if !(0..=6).contains(&body.day_of_week) {
        return Err(Error::BadRequest {
            message: "day_of_week must be between 0 (Monday) and 6 (Sunday)".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let class = Classes::new(&mut conn)
        .create(&ClassCreateDBRequest {
            club_id,
            trainer_id: body.trainer_id,
            name: body.name,
            max_participants: body.max_participants,
            day_of_week: body.day_of_week,
            start_time: body.start_time,
            duration_minutes: body.duration_minutes,
            level: body.level,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(class)))
}

/// Expand a recurrence rule into concrete weekly slots and persist them.
#[utoipa::path(
    post,
    path = "/classes/bulk",
    tag = "classes",
    summary = "Bulk-generate class slots",
    request_body = BulkClassCreate,
    responses(
        (status = 201, description = "Generated classes", body = [ProgrammedClass]),
        (status = 400, description = "Recurrence rule expands to zero slots"),
    ),
    security(("BearerAuth" = []))
)]
pub async fn bulk_create_classes(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Json(body): Json<BulkClassCreate>,
) -> Result<(StatusCode, Json<Vec<ProgrammedClass>>), Error> {
    let club_id = staff.require_club()?;

    let slots = schedule::expand_slots(&body.days_of_week, body.window_start, body.window_end, body.slot_minutes);
    if slots.is_empty() {
        return Err(Error::BadRequest {
            message: "Recurrence rule expands to zero slots".to_string(),
        });
    }

    let requests: Vec<ClassCreateDBRequest> = slots
        .iter()
        .map(|slot| ClassCreateDBRequest {
            club_id,
            trainer_id: body.trainer_id,
            name: format!("{} {} {}", body.name_prefix, weekday_name(slot.day_of_week), slot.start_time.format("%H:%M")),
            max_participants: body.max_participants,
            day_of_week: slot.day_of_week,
            start_time: slot.start_time,
            duration_minutes: slot.duration_minutes,
            level: body.level.clone(),
        })
        .collect();

    let mut tx = state.db.begin().await.map_err(DbError::from)?;
    let created = Classes::new(&mut tx).create_bulk(&requests).await?;
    tx.commit().await.map_err(DbError::from)?;

    tracing::info!(count = created.len(), "Bulk-generated class slots");

    Ok((StatusCode::CREATED, Json(created)))
}

fn weekday_name(day: i16) -> &'static str {
    match day {
        0 => "Mon",
        1 => "Tue",
        2 => "Wed",
        3 => "Thu",
        4 => "Fri",
        5 => "Sat",
        _ => "Sun",
    }
}

// GET /classes
pub async fn list_classes(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<ProgrammedClass>>, Error> {
    let club_id = staff.require_club()?;

    let (skip, limit) = pagination.clamped();
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let classes = Classes::new(&mut conn)
        .list(&ClassFilter {
            club_id,
            status: Some(EntityStatus::Active),
            skip,
            limit,
        })
        .await?;

    Ok(Json(classes))
}

// GET /classes/:id
pub async fn get_class(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<ClassId>,
) -> Result<Json<ProgrammedClass>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let class = owned_class(&mut conn, &staff, id).await?;
    Ok(Json(class))
}

// PATCH /classes/:id
pub async fn update_class(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<ClassId>,
    Json(body): Json<ClassUpdate>,
) -> Result<Json<ProgrammedClass>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    owned_class(&mut conn, &staff, id).await?;

    let class = Classes::new(&mut conn)
        .update(
            id,
            &ClassUpdateDBRequest {
                name: body.name,
                trainer_id: body.trainer_id,
                max_participants: body.max_participants,
                level: body.level,
            },
        )
        .await?;

    Ok(Json(class))
}

// DELETE /classes/:id - archives the class
pub async fn delete_class(State(state): State<AppState>, staff: CurrentStaff, Path(id): Path<ClassId>) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    owned_class(&mut conn, &staff, id).await?;

    Classes::new(&mut conn).archive(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /classes/:id/participants
pub async fn list_participants(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<ClassId>,
) -> Result<Json<Vec<ClassParticipant>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    owned_class(&mut conn, &staff, id).await?;

    let participants = Participants::new(&mut conn).list_for_class(id).await?;
    Ok(Json(participants))
}

/// Enroll a student. Goes through the atomic capacity claim; a full class
/// answers 409.
#[utoipa::path(
    post,
    path = "/classes/{id}/participants",
    tag = "classes",
    summary = "Enroll a student into a class",
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrolled", body = ClassParticipant),
        (status = 404, description = "Class or student not found"),
        (status = 409, description = "Class is full, or student already enrolled"),
    ),
    security(("BearerAuth" = []))
)]
pub async fn enroll_participant(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<ClassId>,
    Json(body): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<ClassParticipant>), Error> {
    let club_id = staff.require_club()?;

    {
        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        owned_class(&mut conn, &staff, id).await?;

        // The student must belong to the same club.
        Students::new(&mut conn)
            .get_by_id(body.student_id)
            .await?
            .filter(|s| s.club_id == club_id)
            .ok_or_else(|| Error::NotFound {
                resource: "Student".to_string(),
                id: body.student_id.to_string(),
            })?;
    }

    let participant = participants::claim_spot(&state.db, id, body.student_id).await?;

    Ok((StatusCode::CREATED, Json(participant)))
}

// DELETE /classes/:id/participants/:participant_id - cancel an enrollment
pub async fn cancel_participant(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path((id, participant_id)): Path<(ClassId, ParticipantId)>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    owned_class(&mut conn, &staff, id).await?;

    let mut participants_repo = Participants::new(&mut conn);
    let participant = participants_repo
        .get_by_id(participant_id)
        .await?
        .filter(|p| p.class_id == id)
        .ok_or_else(|| Error::NotFound {
            resource: "Participant".to_string(),
            id: participant_id.to_string(),
        })?;

    if !participants_repo.cancel(participant.id).await? {
        return Err(Error::Gone {
            message: "Enrollment is already cancelled".to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
