//! WebSocket wire messages.
//!
//! Every frame is a JSON object discriminated by its `type` field.
//! Client frames are parsed leniently: anything that is not a well-formed
//! `hello` or `update` yields `None` and is dropped by the caller.

use axum::extract::ws::Utf8Bytes;
use serde::{Deserialize, Serialize};

use crate::domain::{ClientId, StatePayload};

/// Client → server frames.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Announce or claim an identity.
    Hello {
        /// Identity to register under.
        id: ClientId,
    },
    /// Publish the latest state. A missing or `null` state is ignored.
    Update {
        /// Opaque application state.
        #[serde(default)]
        state: Option<StatePayload>,
    },
}

impl ClientMessage {
    /// Parses a text frame, returning `None` for anything unusable.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

/// Server → client frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full snapshot, or a single-element incremental update.
    State {
        /// Client states.
        clients: Vec<StatePayload>,
    },
    /// A participant left or was pruned.
    Goodbye {
        /// Departed participant.
        id: ClientId,
    },
    /// Keepalive probe; no reply expected.
    Ping,
}

impl ServerMessage {
    /// Serializes the message into a shareable text frame.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a state payload cannot be encoded
    /// (for example a map with non-string keys built in-process).
    pub fn encode(&self) -> Result<Utf8Bytes, serde_json::Error> {
        serde_json::to_string(self).map(Utf8Bytes::from)
    }
}
