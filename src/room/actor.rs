//! Room actor: the single serialized event stream of one room.
//!
//! Every event that can mutate a room (connection attached, text frame,
//! connection closed, liveness tick) is processed here one at a time, in
//! arrival order. The actor stops on shutdown, when every handle is
//! dropped, or after staying vacant for the configured idle TTL.

use std::time::Duration;

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};

use super::{RoomHandle, RoomSettings, RoomState, RoomStats};
use crate::domain::{ConnectionHandle, ConnectionId, RoomName};

/// Events delivered to a room actor.
#[derive(Debug)]
pub enum RoomCommand {
    /// A socket was accepted. `ack` fires once the room owns it.
    Attach {
        /// Sending half of the connection's outbox.
        connection: ConnectionHandle,
        /// Acknowledgement; dropped unanswered if the room is stopping.
        ack: oneshot::Sender<()>,
    },
    /// A text frame arrived.
    Inbound {
        /// Originating connection.
        connection: ConnectionId,
        /// Raw frame text.
        text: Utf8Bytes,
    },
    /// The socket closed.
    Detach {
        /// Closed connection.
        connection: ConnectionId,
    },
    /// Report current counters.
    Stats {
        /// Reply channel.
        reply: oneshot::Sender<RoomStats>,
    },
    /// Close every connection and stop.
    Shutdown,
}

/// Event loop owning one [`RoomState`].
#[derive(Debug)]
pub struct RoomActor {
    state: RoomState,
    inbox: mpsc::Receiver<RoomCommand>,
    settings: RoomSettings,
}

impl RoomActor {
    /// Spawns the actor for `name` on the current runtime and returns its
    /// handle.
    #[must_use]
    pub fn spawn(name: RoomName, settings: RoomSettings) -> RoomHandle {
        let (commands, inbox) = mpsc::channel(settings.mailbox_capacity.max(1));
        let handle = RoomHandle::new(name.clone(), commands);
        let actor = Self {
            state: RoomState::new(name, settings.liveness),
            inbox,
            settings,
        };
        tokio::spawn(actor.run());
        handle
    }

    async fn run(mut self) {
        // `interval_at` panics on a zero period.
        let period = self
            .settings
            .liveness
            .heartbeat_interval
            .max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut vacant_since = Some(Instant::now());
        tracing::info!(room = %self.state.name(), "room started");

        loop {
            tokio::select! {
                command = self.inbox.recv() => {
                    match command {
                        Some(RoomCommand::Shutdown) | None => break,
                        Some(command) => self.dispatch(command),
                    }
                }
                now = ticker.tick() => {
                    self.state.tick(now);
                    if let Some(since) = vacant_since
                        && now.saturating_duration_since(since) >= self.settings.idle_ttl
                    {
                        tracing::info!(room = %self.state.name(), "room idle, stopping");
                        break;
                    }
                }
            }

            vacant_since = match (self.state.is_vacant(), vacant_since) {
                (true, None) => Some(Instant::now()),
                (true, since @ Some(_)) => since,
                (false, _) => None,
            };
        }

        // Refuse late arrivals: dropping an unanswered `Attach` tells the
        // caller to retry on a fresh room.
        self.inbox.close();
        while let Ok(command) = self.inbox.try_recv() {
            if let RoomCommand::Stats { reply } = command {
                let _ = reply.send(self.state.stats());
            }
        }
        self.state.shutdown();
        tracing::info!(room = %self.state.name(), "room stopped");
    }

    fn dispatch(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Attach { connection, ack } => {
                self.state.attach(connection);
                let _ = ack.send(());
            }
            RoomCommand::Inbound { connection, text } => {
                self.state
                    .handle_text(connection, text.as_str(), Instant::now());
            }
            RoomCommand::Detach { connection } => self.state.detach(connection),
            RoomCommand::Stats { reply } => {
                let _ = reply.send(self.state.stats());
            }
            RoomCommand::Shutdown => {}
        }
    }
}
