//! Session protocol: inbound frames and close events.
//!
//! Per connection the lifecycle is `Unidentified → Identified → Closed`.
//! Frames that do not parse, carry an unknown `type`, or arrive in the
//! wrong phase are dropped without touching the registry.

use tokio::time::Instant;

use super::RoomState;
use super::broadcast::{broadcast, send_to};
use super::state::close_quietly;
use crate::domain::{ClientId, CloseReason, ConnectionId, SessionPhase, StatePayload};
use crate::ws::messages::{ClientMessage, ServerMessage};

impl RoomState {
    /// Applies one text frame received on `connection`.
    pub fn handle_text(&mut self, connection: ConnectionId, text: &str, now: Instant) {
        let Some(message) = ClientMessage::parse(text) else {
            tracing::debug!(room = %self.name, connection_id = %connection, "ignoring unusable frame");
            return;
        };
        match message {
            ClientMessage::Hello { id } => self.hello(connection, id, now),
            ClientMessage::Update { state } => self.update(connection, state, now),
        }
    }

    /// Handles the close event of `connection`. Safe to call repeatedly.
    pub fn detach(&mut self, connection: ConnectionId) {
        let Some(phase) = self.peers.remove(&connection) else {
            return;
        };
        tracing::debug!(room = %self.name, connection_id = %connection, "connection detached");
        if let SessionPhase::Identified(id) = phase
            && self.registry.remove_owned(&id, connection).is_some()
        {
            tracing::info!(room = %self.name, client_id = %id, "client left");
            broadcast(&self.registry, &ServerMessage::Goodbye { id }, None);
        }
    }

    fn hello(&mut self, connection: ConnectionId, id: ClientId, now: Instant) {
        let Some(phase) = self.peers.remove(&connection) else {
            return;
        };
        let handle = match phase {
            SessionPhase::Unidentified(handle) => handle,
            SessionPhase::Identified(previous) => {
                let Some(session) = self.registry.remove_owned(&previous, connection) else {
                    tracing::warn!(
                        room = %self.name,
                        connection_id = %connection,
                        client_id = %previous,
                        "identified connection lost its registry entry"
                    );
                    self.peers.insert(connection, SessionPhase::Closed);
                    return;
                };
                if previous != id {
                    tracing::info!(room = %self.name, from = %previous, to = %id, "client renamed");
                    broadcast(
                        &self.registry,
                        &ServerMessage::Goodbye { id: previous },
                        None,
                    );
                }
                session.connection
            }
            SessionPhase::Closed => {
                self.peers.insert(connection, SessionPhase::Closed);
                return;
            }
        };

        if let Some(superseded) = self.registry.register(id.clone(), handle, now) {
            let old = superseded.connection_id();
            tracing::info!(
                room = %self.name,
                client_id = %id,
                connection_id = %old,
                "client id taken over by a new connection"
            );
            close_quietly(&superseded.connection, CloseReason::SUPERSEDED);
            if let Some(old_phase) = self.peers.get_mut(&old) {
                *old_phase = SessionPhase::Closed;
            }
        } else {
            tracing::info!(room = %self.name, client_id = %id, "client joined");
        }
        self.peers
            .insert(connection, SessionPhase::Identified(id.clone()));

        if let Some(session) = self.registry.get(&id) {
            let snapshot = ServerMessage::State {
                clients: self.registry.snapshot(),
            };
            send_to(&session.connection, &snapshot);
        }
    }

    fn update(&mut self, connection: ConnectionId, state: Option<StatePayload>, now: Instant) {
        let Some(SessionPhase::Identified(id)) = self.peers.get(&connection) else {
            tracing::debug!(room = %self.name, connection_id = %connection, "update before hello ignored");
            return;
        };
        let Some(state) = state else {
            return;
        };
        let id = id.clone();
        if self.registry.touch(&id, Some(state.clone()), now) {
            let relay = ServerMessage::State {
                clients: vec![state],
            };
            broadcast(&self.registry, &relay, Some(&id));
        }
    }
}
