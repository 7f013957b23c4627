//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] covers the HTTP edge (upgrade endpoint, REST routes).
//! Each variant maps to a status code and a structured JSON body.
//! [`RoomError`] is the narrower failure of talking to a room actor.
//!
//! Nothing inside a room is fatal: malformed frames, failed sends, and
//! unknown client ids are handled in place and never become errors here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::InvalidRoomName;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1426,
///     "message": "Expected protocol upgrade"
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
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
/// | 1000–1999 | Request    | 400 Bad Request / 426       |
/// | 2000–2999 | Not Found  | 404 Not Found               |
/// | 3000–3999 | Server     | 503 Service Unavailable     |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A room endpoint was hit without a WebSocket upgrade.
    #[error("Expected protocol upgrade")]
    UpgradeRequired,

    /// Room name in the path is not acceptable.
    #[error(transparent)]
    InvalidRoomName(#[from] InvalidRoomName),

    /// No live room with this name.
    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// The room could not be reached (shutdown in progress).
    #[error("room unavailable: {0}")]
    RoomUnavailable(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRoomName(_) => 1001,
            Self::UpgradeRequired => 1426,
            Self::RoomNotFound(_) => 2001,
            Self::RoomUnavailable(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UpgradeRequired => StatusCode::UPGRADE_REQUIRED,
            Self::InvalidRoomName(_) => StatusCode::BAD_REQUEST,
            Self::RoomNotFound(_) => StatusCode::NOT_FOUND,
            Self::RoomUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
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

/// Failure to reach a room actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The actor has stopped and no longer accepts commands.
    #[error("room actor stopped")]
    Closed,
}
