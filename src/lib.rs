//! # room-relay
//!
//! WebSocket presence relay. Clients join a room, announce an identity,
//! publish opaque state, and receive an eventually-consistent view of
//! every other participant's latest state. Nothing is persisted; a room's
//! contents are rebuilt from client re-announcements.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── WS Handlers (ws/)          upgrade, socket loop, wire messages
//!     ├── REST Handlers (api/)       health, room inspection
//!     │
//!     ├── RoomDirectory (room/)      name → actor, lazy spawn, reclaim
//!     ├── RoomActor (room/)          one serialized event stream per room
//!     │     ├── protocol             hello / update / close
//!     │     ├── supervisor           keepalive, prune, snapshot tick
//!     │     └── broadcast            encode once, best-effort fan-out
//!     │
//!     └── ConnectionRegistry (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod room;
pub mod ws;
