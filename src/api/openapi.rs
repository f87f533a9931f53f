//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use crate::api::dto::{HealthResponse, SubscriptionsResponse};
use crate::api::handlers::{changes, subscriptions, system};
use crate::domain::{ChangeAction, ChangeEvent};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::{Delivery, DispatchOutcome};

/// Generated OpenAPI specification.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "change-relay",
        description = "Change-feed mediator for real-time clients",
    ),
    paths(
        system::health_handler,
        changes::submit_change,
        subscriptions::get_subscriptions,
    ),
    components(schemas(
        ChangeEvent,
        ChangeAction,
        DispatchOutcome,
        Delivery,
        HealthResponse,
        SubscriptionsResponse,
        ErrorResponse,
        ErrorBody,
    ))
)]
pub struct ApiDoc;
