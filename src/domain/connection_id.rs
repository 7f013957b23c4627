//! Type-safe connection identifier.
//!
//! [`ConnectionId`] names one accepted WebSocket transport. It is distinct
//! from [`super::ClientId`], which is chosen by the client and may move
//! between connections when a participant re-joins.

use std::fmt;

use serde::Serialize;

/// Server-assigned identifier for a single accepted connection.
///
/// Wraps a UUID v4 generated when the socket is accepted. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
