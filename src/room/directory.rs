//! Process-wide mapping from room name to room actor.
//!
//! [`RoomDirectory`] lazily spawns one [`RoomActor`] per distinct name.
//! Actors reclaim themselves when vacant for too long; the directory
//! notices their closed handles and spawns a fresh actor on next use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::{RoomActor, RoomHandle, RoomSettings, RoomStats};
use crate::domain::{ConnectionHandle, ConnectionId, Outbox, RoomName};
use crate::error::{RelayError, RoomError};

/// How many times a join retries when it races a stopping actor.
const JOIN_ATTEMPTS: usize = 3;

/// A connection attached to a room, ready for its socket loop.
#[derive(Debug)]
pub struct Membership {
    /// Room the connection belongs to.
    pub room: RoomHandle,
    /// Server-assigned connection id.
    pub connection_id: ConnectionId,
    /// Frames the room wants written to the socket.
    pub outbox: Outbox,
}

/// Concurrent room-name → actor map with lazy creation.
#[derive(Debug)]
pub struct RoomDirectory {
    rooms: RwLock<HashMap<RoomName, RoomHandle>>,
    settings: RoomSettings,
    closing: AtomicBool,
}

impl RoomDirectory {
    /// Creates an empty directory; rooms use `settings` when spawned.
    #[must_use]
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            settings,
            closing: AtomicBool::new(false),
        }
    }

    /// Returns `true` once [`RoomDirectory::shutdown`] has been called.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    /// Returns the live actor for `name`, spawning one if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RoomUnavailable`] during shutdown.
    pub async fn room(&self, name: &RoomName) -> Result<RoomHandle, RelayError> {
        if self.is_closing() {
            return Err(RelayError::RoomUnavailable(name.to_string()));
        }
        {
            let map = self.rooms.read().await;
            if let Some(handle) = map.get(name)
                && !handle.is_closed()
            {
                return Ok(handle.clone());
            }
        }

        let mut map = self.rooms.write().await;
        if let Some(handle) = map.get(name)
            && !handle.is_closed()
        {
            return Ok(handle.clone());
        }
        map.retain(|_, handle| !handle.is_closed());
        let handle = RoomActor::spawn(name.clone(), self.settings);
        map.insert(name.clone(), handle.clone());
        Ok(handle)
    }

    /// Returns the live actor for `name` without spawning one.
    pub async fn get(&self, name: &RoomName) -> Option<RoomHandle> {
        self.rooms
            .read()
            .await
            .get(name)
            .filter(|handle| !handle.is_closed())
            .cloned()
    }

    /// Creates a connection outbox and attaches it to `name`.
    ///
    /// Retries on a fresh actor if the current one stops mid-attach.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RoomUnavailable`] during shutdown or if every
    /// attempt raced a stopping actor.
    pub async fn join(
        &self,
        name: &RoomName,
        outbound_capacity: usize,
    ) -> Result<Membership, RelayError> {
        for attempt in 1..=JOIN_ATTEMPTS {
            let room = self.room(name).await?;
            let (connection, outbox) = ConnectionHandle::channel(outbound_capacity);
            let connection_id = connection.id();
            match room.attach(connection).await {
                Ok(()) => {
                    return Ok(Membership {
                        room,
                        connection_id,
                        outbox,
                    });
                }
                Err(RoomError::Closed) => {
                    tracing::debug!(room = %name, attempt, "room stopped during attach, retrying");
                }
            }
        }
        Err(RelayError::RoomUnavailable(name.to_string()))
    }

    /// Returns counters for every live room, sorted by name.
    pub async fn list(&self) -> Vec<RoomStats> {
        let handles: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();
        let mut stats = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(room) = handle.stats().await {
                stats.push(room);
            }
        }
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }

    /// Returns the number of rooms whose actor is still running.
    pub async fn len(&self) -> usize {
        self.rooms
            .read()
            .await
            .values()
            .filter(|handle| !handle.is_closed())
            .count()
    }

    /// Returns `true` if no room is running.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stops accepting joins and shuts every room down.
    pub async fn shutdown(&self) {
        self.closing.store(true, Ordering::Release);
        let rooms: Vec<RoomHandle> = self.rooms.write().await.drain().map(|(_, h)| h).collect();
        tracing::info!(rooms = rooms.len(), "shutting down rooms");
        for room in rooms {
            room.shutdown().await;
        }
    }
}
