//! Mutable state of one room.
//!
//! [`RoomState`] is owned by a single [`super::RoomActor`] and mutated only
//! from its event loop. All methods are synchronous and take the current
//! instant explicitly, which keeps them deterministic under test.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::LivenessPolicy;
use crate::domain::{
    CloseReason, ConnectionHandle, ConnectionId, ConnectionRegistry, RoomName, SessionPhase,
};

/// Point-in-time counters for one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoomStats {
    /// Room name.
    pub name: String,
    /// Live connections, identified or not.
    pub connections: usize,
    /// Connections the room has closed whose sockets have not finished
    /// tearing down yet.
    pub closing: usize,
    /// Identified participants.
    pub clients: usize,
    /// Participants that have published at least one state.
    pub with_state: usize,
}

/// Registry plus per-connection lifecycle for one room.
#[derive(Debug)]
pub struct RoomState {
    pub(super) name: RoomName,
    pub(super) registry: ConnectionRegistry,
    pub(super) peers: HashMap<ConnectionId, SessionPhase>,
    pub(super) policy: LivenessPolicy,
}

impl RoomState {
    /// Creates an empty room.
    #[must_use]
    pub fn new(name: RoomName, policy: LivenessPolicy) -> Self {
        Self {
            name,
            registry: ConnectionRegistry::new(),
            peers: HashMap::new(),
            policy,
        }
    }

    /// Returns the room name.
    #[must_use]
    pub const fn name(&self) -> &RoomName {
        &self.name
    }

    /// Returns the participant registry.
    #[must_use]
    pub const fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Returns the lifecycle phase of a connection, if attached.
    #[must_use]
    pub fn phase(&self, connection: ConnectionId) -> Option<&SessionPhase> {
        self.peers.get(&connection)
    }

    /// Returns `true` when no connection is attached.
    #[must_use]
    pub fn is_vacant(&self) -> bool {
        self.peers.is_empty()
    }

    /// Accepts a new connection as unidentified.
    pub fn attach(&mut self, connection: ConnectionHandle) {
        let id = connection.id();
        tracing::debug!(room = %self.name, connection_id = %id, "connection attached");
        self.peers.insert(id, SessionPhase::Unidentified(connection));
    }

    /// Closes every connection and forgets all participants.
    pub fn shutdown(&mut self) {
        for (_, phase) in self.peers.drain() {
            if let SessionPhase::Unidentified(connection) = phase {
                close_quietly(&connection, CloseReason::SHUTDOWN);
            }
        }
        for session in self.registry.drain() {
            close_quietly(&session.connection, CloseReason::SHUTDOWN);
        }
    }

    /// Returns current counters.
    #[must_use]
    pub fn stats(&self) -> RoomStats {
        let closing = self.peers.values().filter(|p| p.is_closed()).count();
        RoomStats {
            name: self.name.to_string(),
            connections: self.peers.len().saturating_sub(closing),
            closing,
            clients: self.registry.len(),
            with_state: self
                .registry
                .sessions()
                .filter(|session| session.state.is_some())
                .count(),
        }
    }
}

/// Queues a close frame, logging instead of failing if the peer is gone.
pub(super) fn close_quietly(connection: &ConnectionHandle, reason: CloseReason) {
    if let Err(err) = connection.close(reason) {
        tracing::debug!(
            connection_id = %connection.id(),
            reason = reason.reason,
            error = %err,
            "close frame not queued"
        );
    }
}
