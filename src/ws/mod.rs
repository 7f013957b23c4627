//! WebSocket layer: upgrade endpoints, socket loop, wire messages.
//!
//! `/ws` joins the default room; `/rooms/{name}/ws` joins a named room.

pub mod connection;
pub mod handler;
pub mod messages;

use axum::Router;
use axum::routing::any;

use crate::app_state::AppState;

/// WebSocket upgrade routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ws", any(handler::default_room_handler))
        .route("/rooms/{name}/ws", any(handler::room_handler))
}
