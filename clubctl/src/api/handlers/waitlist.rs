//! Staff-facing waitlist handlers: join, inspect, and manual triggers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::waitlist::JoinWaitlistRequest,
    auth::CurrentStaff,
    db::{
        errors::DbError,
        handlers::{Classes, Participants, Repository, Students, Waitlist},
        models::{waitlist::WaitlistEntry, EntityStatus},
    },
    errors::Error,
    types::ClassId,
    waitlist::{capacity::SweepSummary, CapacityChecker, Notifier, NotifyOutcome},
    AppState,
};

fn class_not_found(id: ClassId) -> Error {
    Error::NotFound {
        resource: "Class".to_string(),
        id: id.to_string(),
    }
}

// GET /classes/:id/waitlist - entries with status and offer deadlines (the
// UI renders its countdown off expires_at)
pub async fn list_waitlist(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<ClassId>,
) -> Result<Json<Vec<WaitlistEntry>>, Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    Classes::new(&mut conn)
        .get_by_id(id)
        .await?
        .filter(|c| c.club_id == club_id)
        .ok_or_else(|| class_not_found(id))?;

    let entries = Waitlist::new(&mut conn).list_for_class(id).await?;
    Ok(Json(entries))
}

/// Put a student on the waitlist for a full class.
#[utoipa::path(
    post,
    path = "/classes/{id}/waitlist",
    tag = "waitlist",
    summary = "Join a class waitlist",
    request_body = JoinWaitlistRequest,
    responses(
        (status = 201, description = "Waiting for a spot", body = WaitlistEntry),
        (status = 404, description = "Class or student not found"),
        (status = 409, description = "Student already has an open waitlist entry"),
    ),
    security(("BearerAuth" = []))
)]
pub async fn join_waitlist(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<ClassId>,
    Json(body): Json<JoinWaitlistRequest>,
) -> Result<(StatusCode, Json<WaitlistEntry>), Error> {
    let club_id = staff.require_club()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    Classes::new(&mut conn)
        .get_by_id(id)
        .await?
        .filter(|c| c.club_id == club_id && c.status == EntityStatus::Active)
        .ok_or_else(|| class_not_found(id))?;

    Students::new(&mut conn)
        .get_by_id(body.student_id)
        .await?
        .filter(|s| s.club_id == club_id)
        .ok_or_else(|| Error::NotFound {
            resource: "Student".to_string(),
            id: body.student_id.to_string(),
        })?;

    let entry = Waitlist::new(&mut conn).join(id, body.student_id).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Staff "notify next" trigger. Bypasses the sweep's cooldown but still
/// requires an actual free spot.
#[utoipa::path(
    post,
    path = "/classes/{id}/waitlist/notify",
    tag = "waitlist",
    summary = "Send a spot offer for this class now",
    responses(
        (status = 200, description = "Offer sent", body = NotifyOutcome),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Class has no free spots"),
    ),
    security(("BearerAuth" = []))
)]
pub async fn notify_next(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<ClassId>,
) -> Result<Json<NotifyOutcome>, Error> {
    let club_id = staff.require_club()?;

    let available = {
        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        let class = Classes::new(&mut conn)
            .get_by_id(id)
            .await?
            .filter(|c| c.club_id == club_id && c.status == EntityStatus::Active)
            .ok_or_else(|| class_not_found(id))?;

        let active = Participants::new(&mut conn).count_active(id).await?;
        class.max_participants as i64 - active
    };

    if available <= 0 {
        return Err(Error::Conflict {
            message: "Class has no free spots".to_string(),
        });
    }

    let notifier = Notifier::new(state.db.clone(), state.messaging.clone(), &state.config);
    let outcome = notifier.notify(id, available as i32).await?;

    Ok(Json(outcome))
}

// POST /waitlist/sweep - run one capacity sweep now (the external-cron
// shape of the original deployment)
pub async fn sweep_now(State(state): State<AppState>, staff: CurrentStaff) -> Result<Json<SweepSummary>, Error> {
    // Any authenticated key may trigger a sweep; it only acts on classes
    // with free spots and is cooldown-limited per class.
    let _ = staff;

    let notifier = Notifier::new(state.db.clone(), state.messaging.clone(), &state.config);
    let checker = CapacityChecker::new(state.db.clone(), notifier, &state.config);
    let summary = checker.sweep().await?;

    Ok(Json(summary))
}
