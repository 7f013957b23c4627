//! Client-declared participant identity.
//!
//! A [`ClientId`] is whatever the client announces in its `hello` frame.
//! The relay treats it as an opaque, non-empty string. Numeric ids are
//! accepted on the wire and stored as their decimal text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque participant identity, unique within one room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawClientId", into = "String")]
pub struct ClientId(String);

/// Error returned when a wire value cannot be used as a [`ClientId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("client id must be a non-empty string")]
pub struct InvalidClientId;

impl ClientId {
    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = InvalidClientId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(InvalidClientId);
        }
        Ok(Self(value))
    }
}

impl TryFrom<&str> for ClientId {
    type Error = InvalidClientId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire forms accepted for an id before validation.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawClientId {
    Text(String),
    Number(serde_json::Number),
}

impl TryFrom<RawClientId> for ClientId {
    type Error = InvalidClientId;

    fn try_from(raw: RawClientId) -> Result<Self, Self::Error> {
        match raw {
            RawClientId::Text(s) => Self::try_from(s),
            RawClientId::Number(n) => Self::try_from(n.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_rejected() {
        assert_eq!(ClientId::try_from(""), Err(InvalidClientId));
    }

    #[test]
    fn numeric_wire_id_becomes_text() {
        let Ok(id) = serde_json::from_str::<ClientId>("42") else {
            panic!("numeric id should deserialize");
        };
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn object_wire_id_is_rejected() {
        assert!(serde_json::from_str::<ClientId>(r#"{"a":1}"#).is_err());
        assert!(serde_json::from_str::<ClientId>("null").is_err());
        assert!(serde_json::from_str::<ClientId>(r#""""#).is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let Ok(id) = ClientId::try_from("alice") else {
            panic!("valid id");
        };
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some(r#""alice""#));
    }
}
