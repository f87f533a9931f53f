//! Read-only subscription inspection.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::SubscriptionsResponse;
use crate::app_state::AppState;

/// `GET /subscriptions/{user_id}` — List a user's subscribed tables.
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/{user_id}",
    tag = "Subscriptions",
    summary = "List a user's subscriptions",
    description = "Returns the tables the user is subscribed to. A user without subscriptions yields an empty list.",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Subscribed tables", body = SubscriptionsResponse),
    )
)]
pub async fn get_subscriptions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let tables = state.mediator.list_subscriptions(&user_id);
    Json(SubscriptionsResponse { user_id, tables })
}

/// Subscription routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/subscriptions/{user_id}", get(get_subscriptions))
}
