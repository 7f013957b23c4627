//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Unset or unparsable values fall back
//! to the defaults below, except `LISTEN_ADDR`, which must parse if set.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::RoomName;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Room served at `/ws`.
    pub default_room: RoomName,

    /// Period of the liveness tick (keepalive, prune, snapshot).
    pub heartbeat_interval: Duration,

    /// Silence longer than this gets a participant pruned.
    pub idle_timeout: Duration,

    /// How long a room actor lingers with no connections.
    pub room_idle_ttl: Duration,

    /// Capacity of each room actor's mailbox.
    pub room_mailbox_capacity: usize,

    /// Capacity of each connection's outbound frame queue.
    pub outbound_queue_capacity: usize,

    /// Longest a single socket write may take before the peer is dropped.
    pub write_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            default_room: RoomName::default(),
            heartbeat_interval: Duration::from_millis(5_000),
            idle_timeout: Duration::from_millis(20_000),
            room_idle_ttl: Duration::from_secs(60),
            room_mailbox_capacity: 1_024,
            outbound_queue_capacity: 256,
            write_timeout: Duration::from_millis(10_000),
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.listen_addr,
        };

        let default_room = std::env::var("DEFAULT_ROOM")
            .ok()
            .and_then(|raw| match RoomName::try_from(raw) {
                Ok(name) => Some(name),
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring DEFAULT_ROOM");
                    None
                }
            })
            .unwrap_or(defaults.default_room);

        let heartbeat_interval = Duration::from_millis(parse_env("HEARTBEAT_INTERVAL_MS", 5_000));
        let idle_timeout = Duration::from_millis(parse_env("IDLE_TIMEOUT_MS", 20_000));
        let room_idle_ttl = Duration::from_secs(parse_env("ROOM_IDLE_TTL_SECS", 60));
        let room_mailbox_capacity = parse_env("ROOM_MAILBOX_CAPACITY", 1_024);
        let outbound_queue_capacity = parse_env("OUTBOUND_QUEUE_CAPACITY", 256);
        let write_timeout = Duration::from_millis(parse_env("WRITE_TIMEOUT_MS", 10_000));

        Ok(Self {
            listen_addr,
            default_room,
            heartbeat_interval: non_zero(heartbeat_interval, defaults.heartbeat_interval),
            idle_timeout,
            room_idle_ttl,
            room_mailbox_capacity,
            outbound_queue_capacity,
            write_timeout: non_zero(write_timeout, defaults.write_timeout),
        })
    }
}

/// `tokio::time::interval` panics on a zero period, and a zero write
/// deadline would drop every peer.
fn non_zero(value: Duration, default: Duration) -> Duration {
    if value.is_zero() { default } else { value }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_timings() {
        let config = RelayConfig::default();
        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(config.idle_timeout, Duration::from_secs(20));
        assert_eq!(config.default_room.as_str(), "global-room");
        assert_eq!(config.write_timeout, Duration::from_secs(10));
    }

    #[test]
    fn zero_heartbeat_falls_back() {
        assert_eq!(
            non_zero(Duration::ZERO, Duration::from_secs(5)),
            Duration::from_secs(5)
        );
        assert_eq!(
            non_zero(Duration::from_millis(50), Duration::from_secs(5)),
            Duration::from_millis(50)
        );
    }
}
