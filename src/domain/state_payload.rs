//! Opaque client state.

use serde::{Deserialize, Serialize};

/// Application state reported by a client.
///
/// The relay stores and forwards it verbatim and never looks inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatePayload(serde_json::Value);

impl StatePayload {
    /// Wraps a JSON value.
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Returns the wrapped JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for StatePayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
