//! HTTP handlers for payment processing endpoints.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;

use crate::{
    api::models::payments::{CheckoutRequest, CheckoutResponse},
    auth::CurrentStaff,
    db::{
        errors::DbError,
        handlers::{Classes, Participants, Repository, Students},
    },
    errors::Error,
    payment_providers::CheckoutContext,
    AppState,
};

/// Create a checkout session for an enrollment.
#[utoipa::path(
    post,
    path = "/payments/checkout",
    tag = "payments",
    summary = "Create checkout session",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout URL to redirect the student to", body = CheckoutResponse),
        (status = 404, description = "Participant not found"),
        (status = 501, description = "No payment provider configured"),
    ),
    security(("BearerAuth" = []))
)]
pub async fn create_checkout(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, Error> {
    let club_id = staff.require_club()?;

    let Some(provider) = state.payments.as_ref() else {
        tracing::warn!("Checkout requested but no payment provider is configured");
        return Err(Error::BadRequest {
            message: "No payment provider configured".to_string(),
        });
    };

    let checkout = {
        let mut conn = state.db.acquire().await.map_err(DbError::from)?;

        let participant = Participants::new(&mut conn)
            .get_by_id(body.participant_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                resource: "Participant".to_string(),
                id: body.participant_id.to_string(),
            })?;

        // Scope check through the participant's class.
        Classes::new(&mut conn)
            .get_by_id(participant.class_id)
            .await?
            .filter(|c| c.club_id == club_id)
            .ok_or_else(|| Error::NotFound {
                resource: "Participant".to_string(),
                id: body.participant_id.to_string(),
            })?;

        let student = Students::new(&mut conn)
            .get_by_id(participant.student_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                resource: "Student".to_string(),
                id: participant.student_id.to_string(),
            })?;

        CheckoutContext {
            participant_id: participant.id,
            club_id,
            student_email: student.email,
        }
    };

    let success_url = format!("{}/payments/success?session_id={{CHECKOUT_SESSION_ID}}", state.config.public_url);
    let cancel_url = format!("{}/payments/cancelled", state.config.public_url);

    let url = provider
        .create_checkout_session(&state.db, &checkout, &cancel_url, &success_url)
        .await
        .map_err(|e| Error::Internal {
            operation: format!("create checkout session: {e}"),
        })?;

    Ok(Json(CheckoutResponse { url }))
}

/// Manually process a checkout session.
///
/// Fallback for when webhooks fail or for immediate confirmation after the
/// redirect; idempotent either way.
#[utoipa::path(
    post,
    path = "/payments/{session_id}/process",
    tag = "payments",
    summary = "Process payment for checkout session",
    responses(
        (status = 200, description = "Payment processed (idempotent)"),
        (status = 402, description = "Payment not completed yet"),
        (status = 400, description = "Invalid session ID or missing data"),
    ),
    security(("BearerAuth" = []))
)]
pub async fn process_payment(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(session_id): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), Error> {
    staff.require_club()?;

    let Some(provider) = state.payments.as_ref() else {
        return Err(Error::BadRequest {
            message: "No payment provider configured".to_string(),
        });
    };

    match provider.process_payment_session(&state.db, &session_id).await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Payment processed successfully" })),
        )),
        Err(e) => {
            let status = StatusCode::from(e);
            if status == StatusCode::OK {
                // AlreadyProcessed collapses to success for idempotency
                return Ok((status, Json(json!({ "success": true, "message": "Payment already processed" }))));
            }
            Ok((status, Json(json!({ "error": "Payment processing failed" }))))
        }
    }
}

/// Payment provider webhook sink.
///
/// Signature validation is delegated to the provider; once an event
/// validates we always answer 200 so the provider stops retrying.
#[tracing::instrument(skip_all)]
pub async fn webhook_handler(State(state): State<AppState>, headers: HeaderMap, body: String) -> StatusCode {
    let Some(provider) = state.payments.as_ref() else {
        tracing::warn!("Payment webhook called but no payment provider is configured");
        return StatusCode::NOT_IMPLEMENTED;
    };

    let event = match provider.validate_webhook(&headers, &body).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            tracing::debug!("Provider does not consume webhooks, acknowledging");
            return StatusCode::OK;
        }
        Err(e) => {
            tracing::error!(error = %e, "Webhook validation failed");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::info!(event_type = %event.event_type, "Received payment webhook event");

    if let Err(e) = provider.process_webhook_event(&state.db, &event).await {
        // Still 200: retrying a failed settlement would hit the same error,
        // and manual processing exists as the fallback path.
        tracing::error!(error = %e, "Webhook event processing failed");
    }

    StatusCode::OK
}
