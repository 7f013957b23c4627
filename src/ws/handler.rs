//! Axum WebSocket upgrade handlers.
//!
//! Both endpoints are mounted with `any()` so that every non-upgrade
//! request, whatever its method, gets `426 Expected protocol upgrade`.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::RoomName;
use crate::error::RelayError;

/// `GET /ws` — Upgrade into the configured default room.
///
/// # Errors
///
/// Returns [`RelayError::UpgradeRequired`] for non-upgrade requests and
/// [`RelayError::RoomUnavailable`] while the server shuts down.
pub async fn default_room_handler(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    let ws = upgrade.map_err(|_| RelayError::UpgradeRequired)?;
    let name = state.config.default_room.clone();
    accept(ws, state, name)
}

/// `GET /rooms/{name}/ws` — Upgrade into room `name`.
///
/// # Errors
///
/// Returns [`RelayError::UpgradeRequired`] for non-upgrade requests,
/// [`RelayError::InvalidRoomName`] for a bad name, and
/// [`RelayError::RoomUnavailable`] while the server shuts down.
pub async fn room_handler(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    let ws = upgrade.map_err(|_| RelayError::UpgradeRequired)?;
    let name = RoomName::try_from(name)?;
    accept(ws, state, name)
}

fn accept(ws: WebSocketUpgrade, state: AppState, name: RoomName) -> Result<Response, RelayError> {
    if state.rooms.is_closing() {
        return Err(RelayError::RoomUnavailable(name.to_string()));
    }
    let capacity = state.config.outbound_queue_capacity;
    let write_timeout = state.config.write_timeout;
    let rooms = state.rooms;

    Ok(ws
        .on_failed_upgrade(|err| tracing::debug!(error = %err, "websocket upgrade failed"))
        .on_upgrade(move |socket| async move {
            match rooms.join(&name, capacity).await {
                Ok(membership) => run_connection(socket, membership, write_timeout).await,
                Err(err) => tracing::warn!(room = %name, error = %err, "could not join room"),
            }
        })
        .into_response())
}
