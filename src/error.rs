//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type for the relay. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Inside the routing core only [`RelayError::InvalidEvent`] and
//! [`RelayError::UnknownAction`] ever reach a caller; delivery failures are
//! recorded and logged instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid change event: table must not be empty",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`RelayError`] for ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status                 |
/// |-----------|------------|-----------------------------|
/// | 1000–1999 | Validation | 400 Bad Request             |
/// | 3000–3999 | Server     | 500 / 502                   |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A change event violated the upstream contract (empty table,
    /// undecodable payload).
    #[error("invalid change event: {0}")]
    InvalidEvent(String),

    /// The change action is not one of `INSERT`, `UPDATE`, `DELETE`.
    #[error("unknown change action: {0}")]
    UnknownAction(String),

    /// A client request was malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A broadcast call failed inside the transport.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The upstream change feed or its database failed.
    #[error("change feed error: {0}")]
    ChangeFeed(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidEvent(_) => 1001,
            Self::UnknownAction(_) => 1002,
            Self::InvalidRequest(_) => 1003,
            Self::Internal(_) => 3000,
            Self::Delivery(_) => 3001,
            Self::ChangeFeed(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidEvent(_) | Self::UnknownAction(_) | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
            Self::ChangeFeed(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for RelayError {
    fn from(err: sqlx::Error) -> Self {
        Self::ChangeFeed(err.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
