//! Subscription inspection DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Response body for `GET /api/v1/subscriptions/{user_id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionsResponse {
    /// User the subscriptions belong to.
    pub user_id: String,
    /// Subscribed table names, sorted.
    pub tables: Vec<String>,
}
