//! Student management handlers (club-scoped).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        pagination::PaginationQuery,
        students::{StudentCreate, StudentUpdate},
    },
    auth::CurrentStaff,
    db::{
        errors::DbError,
        handlers::{Repository, Students},
        models::students::{Student, StudentCreateDBRequest, StudentFilter, StudentUpdateDBRequest},
    },
    errors::Error,
    types::StudentId,
    AppState,
};

fn not_found(id: StudentId) -> Error {
    Error::NotFound {
        resource: "Student".to_string(),
        id: id.to_string(),
    }
}

// POST /students
pub async fn create_student(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Json(body): Json<StudentCreate>,
) -> Result<(StatusCode, Json<Student>), Error> {
    let club_id = staff.require_club()?;

    if !body.email.contains('@') {
        return Err(Error::BadRequest {
            message: "A valid email address is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let student = Students::new(&mut conn)
        .create(&StudentCreateDBRequest {
            club_id,
            name: body.name,
            email: body.email,
            phone: body.phone,
            level: body.level,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(student)))
}

// GET /students
pub async fn list_students(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<Student>>, Error> {
    let club_id = staff.require_club()?;

    let (skip, limit) = pagination.clamped();
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let students = Students::new(&mut conn)
        .list(&StudentFilter {
            club_id,
            status: None,
            skip,
            limit,
        })
        .await?;

    Ok(Json(students))
}

// GET /students/:id
pub async fn get_student(State(state): State<AppState>, staff: CurrentStaff, Path(id): Path<StudentId>) -> Result<Json<Student>, Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let student = Students::new(&mut conn)
        .get_by_id(id)
        .await?
        .filter(|s| s.club_id == club_id)
        .ok_or_else(|| not_found(id))?;

    Ok(Json(student))
}

// PATCH /students/:id
pub async fn update_student(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<StudentId>,
    Json(body): Json<StudentUpdate>,
) -> Result<Json<Student>, Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut students = Students::new(&mut conn);

    students.get_by_id(id).await?.filter(|s| s.club_id == club_id).ok_or_else(|| not_found(id))?;

    let student = students
        .update(
            id,
            &StudentUpdateDBRequest {
                name: body.name,
                email: body.email,
                phone: body.phone,
                level: body.level,
            },
        )
        .await?;

    Ok(Json(student))
}

// DELETE /students/:id - archives the student
pub async fn delete_student(State(state): State<AppState>, staff: CurrentStaff, Path(id): Path<StudentId>) -> Result<StatusCode, Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut students = Students::new(&mut conn);

    students.get_by_id(id).await?.filter(|s| s.club_id == club_id).ok_or_else(|| not_found(id))?;

    students.archive(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
