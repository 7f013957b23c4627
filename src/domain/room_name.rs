//! Validated room name.

use std::fmt;

use serde::Serialize;

/// Room used by the bare `/ws` endpoint unless configured otherwise.
pub const DEFAULT_ROOM_NAME: &str = "global-room";

/// Maximum room name length in bytes.
pub const MAX_ROOM_NAME_LEN: usize = 64;

/// Name of a logical room, as it appears in `/rooms/{name}/ws`.
///
/// 1 to 64 characters from `[A-Za-z0-9_.-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoomName(String);

/// Error returned for names outside the allowed alphabet or length.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid room name: {0:?}")]
pub struct InvalidRoomName(pub String);

impl RoomName {
    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RoomName {
    fn default() -> Self {
        Self(DEFAULT_ROOM_NAME.to_string())
    }
}

impl TryFrom<String> for RoomName {
    type Error = InvalidRoomName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let valid = !value.is_empty()
            && value.len() <= MAX_ROOM_NAME_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));
        if valid {
            Ok(Self(value))
        } else {
            Err(InvalidRoomName(value))
        }
    }
}

impl TryFrom<&str> for RoomName {
    type Error = InvalidRoomName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_names() {
        assert!(RoomName::try_from(DEFAULT_ROOM_NAME).is_ok());
        assert!(RoomName::try_from("lobby_2.eu").is_ok());
        assert!(RoomName::try_from("a".repeat(MAX_ROOM_NAME_LEN)).is_ok());
    }

    #[test]
    fn rejects_bad_names() {
        assert!(RoomName::try_from("").is_err());
        assert!(RoomName::try_from("has space").is_err());
        assert!(RoomName::try_from("slash/room").is_err());
        assert!(RoomName::try_from("ü").is_err());
        assert!(RoomName::try_from("a".repeat(MAX_ROOM_NAME_LEN + 1)).is_err());
    }
}
