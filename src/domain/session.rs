//! Per-participant session record and per-connection lifecycle phase.

use tokio::time::Instant;

use super::{ClientId, ConnectionHandle, ConnectionId, StatePayload};

/// One identified participant in a room.
///
/// Owns the participant's [`ConnectionHandle`]. Dropping the session
/// drops the last sender for that connection's outbox, which ends the
/// writer once any queued close frame has been flushed.
#[derive(Debug)]
pub struct ClientSession {
    /// Identity declared in `hello`.
    pub id: ClientId,
    /// Transport send/close handle.
    pub connection: ConnectionHandle,
    /// Last time a valid message arrived from this participant.
    pub last_seen: Instant,
    /// Latest reported state; `None` until the first `update`.
    pub state: Option<StatePayload>,
}

impl ClientSession {
    /// Creates a fresh session with no state.
    #[must_use]
    pub fn new(id: ClientId, connection: ConnectionHandle, now: Instant) -> Self {
        Self {
            id,
            connection,
            last_seen: now,
            state: None,
        }
    }

    /// Returns the id of the connection backing this session.
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.connection.id()
    }
}

/// Where a connection is in its lifecycle once attached to a room.
///
/// `Connecting` happens before the room ever sees the socket, so it has
/// no variant here. While unidentified the room holds the handle itself;
/// once identified the handle moves into the registry's [`ClientSession`].
#[derive(Debug)]
pub enum SessionPhase {
    /// Attached, no `hello` yet.
    Unidentified(ConnectionHandle),
    /// Registered under this id.
    Identified(ClientId),
    /// Closed by the server (timeout or takeover); awaiting the socket's
    /// own close event.
    Closed,
}

impl SessionPhase {
    /// Returns the client id if identified.
    #[must_use]
    pub const fn client_id(&self) -> Option<&ClientId> {
        match self {
            Self::Identified(id) => Some(id),
            Self::Unidentified(_) | Self::Closed => None,
        }
    }

    /// Returns `true` for [`SessionPhase::Closed`].
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
