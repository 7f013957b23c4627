//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::room::{RoomDirectory, RoomSettings};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Room name → room actor map.
    pub rooms: Arc<RoomDirectory>,
    /// Runtime configuration.
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Builds the state and an empty room directory from `config`.
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        let rooms = Arc::new(RoomDirectory::new(RoomSettings::from(&config)));
        Self {
            rooms,
            config: Arc::new(config),
        }
    }
}
