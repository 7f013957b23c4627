//! Room inspection endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::RoomName;
use crate::error::RelayError;
use crate::room::RoomStats;

/// `GET /api/v1/rooms` — List live rooms.
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    summary = "List rooms",
    description = "Returns connection and participant counts for every running room, sorted by name.",
    responses(
        (status = 200, description = "Live rooms", body = Vec<RoomStats>),
    )
)]
pub async fn list_rooms(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.rooms.list().await))
}

/// `GET /api/v1/rooms/{name}` — Inspect one room.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRoomName`] for a bad name and
/// [`RelayError::RoomNotFound`] if no actor is running for it.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{name}",
    tag = "Rooms",
    summary = "Get room",
    params(("name" = String, Path, description = "Room name")),
    responses(
        (status = 200, description = "Room counters", body = RoomStats),
        (status = 400, description = "Invalid room name"),
        (status = 404, description = "Room not running"),
    )
)]
pub async fn get_room(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RoomStats>, RelayError> {
    let name = RoomName::try_from(name)?;
    let not_found = || RelayError::RoomNotFound(name.to_string());
    let room = state.rooms.get(&name).await.ok_or_else(not_found)?;
    let stats = room.stats().await.map_err(|_| not_found())?;
    Ok(Json(stats))
}

/// Room routes, nested under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/{name}", get(get_room))
}
