//! Domain layer: identities, room names, connection handles, sessions,
//! and the per-room registry.
//!
//! Nothing here knows about rooms as actors or about HTTP; these are the
//! plain data types the room actor mutates.

pub mod client_id;
pub mod connection;
pub mod connection_id;
pub mod registry;
pub mod room_name;
pub mod session;
pub mod state_payload;

pub use client_id::{ClientId, InvalidClientId};
pub use connection::{CloseReason, ConnectionHandle, DeliveryError, Outbound, Outbox};
pub use connection_id::ConnectionId;
pub use registry::ConnectionRegistry;
pub use room_name::{InvalidRoomName, RoomName};
pub use session::{ClientSession, SessionPhase};
pub use state_payload::StatePayload;
