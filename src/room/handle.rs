//! Cloneable front for a running room actor.

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{mpsc, oneshot};

use super::{RoomCommand, RoomStats};
use crate::domain::{ConnectionHandle, ConnectionId, RoomName};
use crate::error::RoomError;

/// Sender side of a room actor's mailbox.
///
/// Every method fails with [`RoomError::Closed`] once the actor has
/// stopped; callers decide whether that matters.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    name: RoomName,
    commands: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub(super) const fn new(name: RoomName, commands: mpsc::Sender<RoomCommand>) -> Self {
        Self { name, commands }
    }

    /// Returns the room name.
    #[must_use]
    pub const fn name(&self) -> &RoomName {
        &self.name
    }

    /// Returns `true` once the actor has stopped accepting commands.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Hands a new connection to the room and waits until it is attached.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::Closed`] if the actor stopped before taking
    /// ownership; the connection handle is dropped in that case.
    pub async fn attach(&self, connection: ConnectionHandle) -> Result<(), RoomError> {
        let (ack, attached) = oneshot::channel();
        self.send(RoomCommand::Attach { connection, ack }).await?;
        attached.await.map_err(|_| RoomError::Closed)
    }

    /// Forwards a text frame received on `connection`.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::Closed`] if the actor has stopped.
    pub async fn inbound(&self, connection: ConnectionId, text: Utf8Bytes) -> Result<(), RoomError> {
        self.send(RoomCommand::Inbound { connection, text }).await
    }

    /// Reports that `connection` closed.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::Closed`] if the actor has stopped.
    pub async fn detach(&self, connection: ConnectionId) -> Result<(), RoomError> {
        self.send(RoomCommand::Detach { connection }).await
    }

    /// Queries current counters.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::Closed`] if the actor has stopped.
    pub async fn stats(&self) -> Result<RoomStats, RoomError> {
        let (reply, answer) = oneshot::channel();
        self.send(RoomCommand::Stats { reply }).await?;
        answer.await.map_err(|_| RoomError::Closed)
    }

    /// Asks the actor to close every connection and stop. No-op if it
    /// already stopped.
    pub async fn shutdown(&self) {
        let _ = self.send(RoomCommand::Shutdown).await;
    }

    async fn send(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RoomError::Closed)
    }
}
