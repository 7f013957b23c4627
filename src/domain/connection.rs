//! Send/close handle for one participant's transport.
//!
//! The room actor never touches a socket directly. Each accepted socket
//! gets a bounded outbox drained by a writer task; the actor holds the
//! sending half as a [`ConnectionHandle`] and only ever uses non-blocking
//! `try_send`, so one slow peer cannot stall the room.
//!
//! Close requests travel on a separate `watch` channel. A full outbox
//! therefore never loses a close, and the writer sees it ahead of any
//! text still queued.

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{mpsc, watch};

use super::ConnectionId;

/// Close code and reason sent when the server ends a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseReason {
    /// WebSocket close code.
    pub code: u16,
    /// Human-readable reason.
    pub reason: &'static str,
}

impl CloseReason {
    /// Client exceeded the idle threshold.
    pub const TIMEOUT: Self = Self {
        code: 1001,
        reason: "timeout",
    };

    /// Another connection claimed the same client id.
    pub const SUPERSEDED: Self = Self {
        code: 1000,
        reason: "superseded",
    };

    /// The server is stopping.
    pub const SHUTDOWN: Self = Self {
        code: 1001,
        reason: "shutting down",
    };
}

/// A frame handed to the connection writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Pre-serialized JSON text. Cloning shares the underlying buffer.
    Text(Utf8Bytes),
    /// Close the socket with the given reason.
    Close(CloseReason),
}

/// Why a frame could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The outbox is full; the peer is not keeping up.
    #[error("outbound queue full")]
    Full,
    /// The writer has gone away; the socket is closed or closing.
    #[error("connection closed")]
    Closed,
}

impl<T> From<mpsc::error::TrySendError<T>> for DeliveryError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => Self::Full,
            mpsc::error::TrySendError::Closed(_) => Self::Closed,
        }
    }
}

/// Sending half of a connection's outbox.
#[derive(Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbox: mpsc::Sender<Outbound>,
    closer: watch::Sender<Option<CloseReason>>,
}

impl ConnectionHandle {
    /// Creates a handle with a fresh [`ConnectionId`] and returns it with
    /// the receiving half for the writer task.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, Outbox) {
        let (outbox, frames) = mpsc::channel(capacity.max(1));
        let (closer, close) = watch::channel(None);
        let handle = Self {
            id: ConnectionId::new(),
            outbox,
            closer,
        };
        let outbox = Outbox {
            frames,
            close,
            close_delivered: false,
            closer_gone: false,
        };
        (handle, outbox)
    }

    /// Returns the connection identifier.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a text frame without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the outbox is full or closed.
    pub fn send(&self, frame: Utf8Bytes) -> Result<(), DeliveryError> {
        self.outbox.try_send(Outbound::Text(frame))?;
        Ok(())
    }

    /// Asks the writer to close the socket. Does not consume outbox
    /// capacity; a later request replaces an undelivered earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Closed`] if the writer is gone.
    pub fn close(&self, reason: CloseReason) -> Result<(), DeliveryError> {
        self.closer
            .send(Some(reason))
            .map_err(|_| DeliveryError::Closed)
    }

    /// Returns `true` once the writer has dropped its receiver.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.outbox.is_closed()
    }
}

/// Receiving half of a connection: queued text plus the close signal.
#[derive(Debug)]
pub struct Outbox {
    frames: mpsc::Receiver<Outbound>,
    close: watch::Receiver<Option<CloseReason>>,
    close_delivered: bool,
    closer_gone: bool,
}

impl Outbox {
    /// Waits for the next frame. A pending close is returned before any
    /// queued text. Returns `None` once the handle is dropped and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<Outbound> {
        loop {
            if let Some(reason) = self.pending_close() {
                return Some(Outbound::Close(reason));
            }
            tokio::select! {
                biased;
                changed = self.close.changed(), if !self.closer_gone => {
                    if changed.is_err() {
                        self.closer_gone = true;
                    }
                }
                frame = self.frames.recv() => return frame,
            }
        }
    }

    /// Returns the next frame if one is ready.
    ///
    /// # Errors
    ///
    /// Returns [`mpsc::error::TryRecvError`] if nothing is queued or the
    /// handle is gone.
    pub fn try_recv(&mut self) -> Result<Outbound, mpsc::error::TryRecvError> {
        match self.pending_close() {
            Some(reason) => Ok(Outbound::Close(reason)),
            None => self.frames.try_recv(),
        }
    }

    fn pending_close(&mut self) -> Option<CloseReason> {
        if self.close_delivered {
            return None;
        }
        let reason = *self.close.borrow_and_update();
        self.close_delivered = reason.is_some();
        reason
    }
}
