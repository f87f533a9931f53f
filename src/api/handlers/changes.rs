//! Change ingestion over HTTP.
//!
//! Lets an upstream that cannot use `LISTEN/NOTIFY` (a webhook, a CDC
//! connector) push change events straight into the mediator.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::ChangeEvent;
use crate::error::{ErrorResponse, RelayError};
use crate::service::DispatchOutcome;

/// `POST /changes` — Route one change event.
///
/// # Errors
///
/// Returns [`RelayError::InvalidEvent`] or [`RelayError::UnknownAction`]
/// for a malformed event. Delivery failures are reported in the body, not
/// as an error status.
#[utoipa::path(
    post,
    path = "/api/v1/changes",
    tag = "Changes",
    summary = "Submit a change event",
    description = "Routes a row change to its owner and to the table's subscribers. Delivery is best-effort; the response reports what was attempted.",
    request_body = ChangeEvent,
    responses(
        (status = 202, description = "Event accepted", body = DispatchOutcome),
        (status = 400, description = "Malformed change event", body = ErrorResponse),
    )
)]
pub async fn submit_change(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, RelayError> {
    let event = ChangeEvent::from_json(&body)?;
    let outcome = state.mediator.handle_change(&event).await?;
    Ok((StatusCode::ACCEPTED, Json(outcome)))
}

/// Change routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/changes", post(submit_change))
}
