//! Room layer: one actor per room name.
//!
//! A room serializes every event that touches its registry through a
//! single mailbox:
//!
//! ```text
//! socket reader ──Inbound/Detach──┐
//! ws handler    ──Attach──────────┼──▶ RoomActor ──▶ RoomState
//! ticker        ──tick────────────┘        │           ├── ConnectionRegistry
//!                                          │           └── peers (lifecycle)
//!                                          ▼
//!                              per-connection outboxes (try_send)
//! ```

pub mod actor;
pub mod broadcast;
pub mod directory;
pub mod handle;
pub mod protocol;
pub mod state;
pub mod supervisor;

use std::time::Duration;

pub use actor::{RoomActor, RoomCommand};
pub use directory::{Membership, RoomDirectory};
pub use handle::RoomHandle;
pub use state::{RoomState, RoomStats};
pub use supervisor::{LivenessPolicy, TickReport};

use crate::config::RelayConfig;

/// Parameters every room actor is spawned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSettings {
    /// Keepalive period and idle threshold.
    pub liveness: LivenessPolicy,
    /// How long a room may stay without connections before it stops.
    pub idle_ttl: Duration,
    /// Mailbox capacity of each actor.
    pub mailbox_capacity: usize,
}

impl From<&RelayConfig> for RoomSettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            liveness: LivenessPolicy {
                heartbeat_interval: config.heartbeat_interval,
                idle_timeout: config.idle_timeout,
            },
            idle_ttl: config.room_idle_ttl,
            mailbox_capacity: config.room_mailbox_capacity,
        }
    }
}
