//! Browser-facing waitlist confirmation endpoint.
//!
//! `GET /confirm-waitlist?entry=<id>&action=confirm|decline` drives the
//! `notified -> accepted | skipped` transitions. Responses are static HTML
//! pages; the status codes still say what happened (400/404/409/410/500).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::{
        errors::DbError,
        handlers::{Classes, Clubs, EnrollmentTokens, Participants, Repository, Waitlist},
        models::waitlist::WaitlistStatus,
    },
    errors::Error,
    pages,
    waitlist::Notifier,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    entry: Option<String>,
    action: Option<String>,
}

enum Action {
    Confirm,
    Decline,
}

fn html(status: StatusCode, body: String) -> Response {
    (status, Html(body)).into_response()
}

// GET /confirm-waitlist
pub async fn confirm_waitlist(State(state): State<AppState>, Query(query): Query<ConfirmQuery>) -> Response {
    match handle(state, query).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = ?e, "Waitlist confirmation failed");
            html(StatusCode::INTERNAL_SERVER_ERROR, pages::internal_error())
        }
    }
}

/// The state machine itself. Expected outcomes are rendered pages; only
/// unexpected failures surface as `Err` (and become the generic 500 page).
async fn handle(state: AppState, query: ConfirmQuery) -> Result<Response, Error> {
    let Some(entry_raw) = query.entry else {
        return Ok(html(StatusCode::BAD_REQUEST, pages::bad_request()));
    };
    let Ok(entry_id) = Uuid::parse_str(&entry_raw) else {
        return Ok(html(StatusCode::BAD_REQUEST, pages::bad_request()));
    };

    let action = match query.action.as_deref() {
        None | Some("confirm") => Action::Confirm,
        Some("decline") => Action::Decline,
        Some(_) => return Ok(html(StatusCode::BAD_REQUEST, pages::bad_request())),
    };

    let mut tx = state.db.begin().await.map_err(DbError::from)?;

    let Some(entry) = Waitlist::new(&mut tx).get_by_id(entry_id).await? else {
        return Ok(html(StatusCode::NOT_FOUND, pages::not_found()));
    };

    // Terminal entries can't transition again, whatever the action.
    if entry.status.is_terminal() {
        return Ok(html(StatusCode::GONE, pages::expired()));
    }
    if entry.status != WaitlistStatus::Notified {
        // Still waiting: there is no offer to act on.
        return Ok(html(StatusCode::NOT_FOUND, pages::not_found()));
    }

    if entry.is_expired(Utc::now()) {
        Waitlist::new(&mut tx).mark_skipped(entry.id).await?;
        tx.commit().await.map_err(DbError::from)?;
        return Ok(html(StatusCode::GONE, pages::expired()));
    }

    let Some(class) = Classes::new(&mut tx).get_by_id(entry.class_id).await? else {
        return Ok(html(StatusCode::NOT_FOUND, pages::not_found()));
    };

    match action {
        Action::Confirm => {
            // Re-check capacity under the class row lock: the spot may have
            // been taken between notification and this click.
            let Some(locked_class) = Classes::new(&mut tx).lock_for_update(entry.class_id).await? else {
                return Ok(html(StatusCode::NOT_FOUND, pages::not_found()));
            };

            let mut participants = Participants::new(&mut tx);
            let active = participants.count_active(entry.class_id).await?;
            if active >= locked_class.max_participants as i64 {
                tx.commit().await.map_err(DbError::from)?;
                return Ok(html(StatusCode::CONFLICT, pages::class_full(&class.name)));
            }

            match participants.insert_active(entry.class_id, entry.student_id).await {
                Ok(_) => {}
                Err(DbError::UniqueViolation { .. }) => {
                    // The student already holds an active spot; nothing to claim.
                    return Ok(html(StatusCode::CONFLICT, pages::class_full(&class.name)));
                }
                Err(e) => return Err(e.into()),
            }

            let _ = Waitlist::new(&mut tx).mark_accepted(entry.id).await?;
            if let Some(token_id) = entry.token_id {
                EnrollmentTokens::new(&mut tx).mark_claimed(token_id).await?;
            }

            let club_name = Clubs::new(&mut tx)
                .get_by_id(class.club_id)
                .await?
                .map(|c| c.name)
                .unwrap_or_default();

            tx.commit().await.map_err(DbError::from)?;

            tracing::info!(class = %class.name, entry = %entry.id, "Waitlist entry confirmed");

            Ok(html(StatusCode::OK, pages::confirmed(&class.name, &club_name)))
        }
        Action::Decline => {
            let declined = Waitlist::new(&mut tx).mark_skipped(entry.id).await?;
            tx.commit().await.map_err(DbError::from)?;

            if declined.is_none() {
                // A concurrent request transitioned the entry first.
                return Ok(html(StatusCode::GONE, pages::expired()));
            }

            tracing::info!(class = %class.name, entry = %entry.id, "Waitlist entry declined, cascading offer");

            // Cascade the freed offer to the next candidate. The decline
            // already succeeded; a failed re-notification is logged, not
            // surfaced to the declining user.
            let notifier = Notifier::new(state.db.clone(), state.messaging.clone(), &state.config);
            if let Err(e) = notifier.notify(entry.class_id, 1).await {
                tracing::warn!(class = %class.name, error = %e, "Re-notification after decline failed");
            }

            Ok(html(StatusCode::OK, pages::declined(&class.name)))
        }
    }
}
