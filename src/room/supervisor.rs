//! Liveness supervision: keepalive, idle eviction, snapshot rebroadcast.
//!
//! One tick per room. Each tick pings every attached connection, prunes
//! participants idle for longer than the threshold (closing them with
//! [`CloseReason::TIMEOUT`] and announcing `goodbye`), then broadcasts the
//! full snapshot to whoever remains. Pruning always precedes the snapshot
//! so evicted states never appear in it.

use std::time::Duration;

use tokio::time::Instant;

use super::RoomState;
use super::broadcast::broadcast;
use super::state::close_quietly;
use crate::domain::{ClientId, CloseReason, SessionPhase};
use crate::ws::messages::ServerMessage;

/// Default keepalive/snapshot period.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Default idle threshold before a participant is pruned.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(20);

/// Timing parameters for the liveness tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessPolicy {
    /// Period between ticks.
    pub heartbeat_interval: Duration,
    /// A participant silent for longer than this is pruned.
    pub idle_timeout: Duration,
}

impl Default for LivenessPolicy {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Connections the keepalive was queued on.
    pub pinged: usize,
    /// Participants evicted for inactivity.
    pub pruned: Vec<ClientId>,
    /// Participants the snapshot was queued on.
    pub snapshot_recipients: usize,
}

impl RoomState {
    /// Runs one liveness tick at `now`.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        if self.is_vacant() {
            return TickReport::default();
        }
        let pinged = self.keepalive();
        let pruned = self.prune(now);
        let snapshot = ServerMessage::State {
            clients: self.registry.snapshot(),
        };
        let snapshot_recipients = broadcast(&self.registry, &snapshot, None);

        if !pruned.is_empty() {
            tracing::info!(room = %self.name, pruned = pruned.len(), "idle clients pruned");
        }
        TickReport {
            pinged,
            pruned,
            snapshot_recipients,
        }
    }

    fn keepalive(&self) -> usize {
        let Ok(frame) = ServerMessage::Ping.encode() else {
            return 0;
        };
        let unidentified = self.peers.values().filter_map(|phase| match phase {
            SessionPhase::Unidentified(handle) => Some(handle),
            SessionPhase::Identified(_) | SessionPhase::Closed => None,
        });
        let identified = self.registry.sessions().map(|session| &session.connection);

        let mut pinged = 0;
        for handle in unidentified.chain(identified) {
            match handle.send(frame.clone()) {
                Ok(()) => pinged += 1,
                Err(err) => {
                    tracing::debug!(connection_id = %handle.id(), error = %err, "keepalive skipped");
                }
            }
        }
        pinged
    }

    fn prune(&mut self, now: Instant) -> Vec<ClientId> {
        let idle = self.registry.idle_since(now, self.policy.idle_timeout);
        let mut pruned = Vec::with_capacity(idle.len());
        for id in idle {
            let Some(session) = self.registry.remove(&id) else {
                continue;
            };
            tracing::info!(room = %self.name, client_id = %id, "client timed out");
            close_quietly(&session.connection, CloseReason::TIMEOUT);
            if let Some(phase) = self.peers.get_mut(&session.connection_id()) {
                *phase = SessionPhase::Closed;
            }
            broadcast(&self.registry, &ServerMessage::Goodbye { id: id.clone() }, None);
            pruned.push(id);
        }
        pruned
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::{ConnectionHandle, ConnectionId, Outbound, Outbox, RoomName};

    struct Peer {
        id: ConnectionId,
        rx: Outbox,
    }

    impl Peer {
        fn drain(&mut self) -> Vec<Outbound> {
            let mut out = Vec::new();
            while let Ok(frame) = self.rx.try_recv() {
                out.push(frame);
            }
            out
        }

        fn texts(&mut self) -> Vec<Value> {
            self.drain()
                .into_iter()
                .filter_map(|frame| match frame {
                    Outbound::Text(text) => serde_json::from_str(text.as_str()).ok(),
                    Outbound::Close(_) => None,
                })
                .collect()
        }
    }

    fn room() -> RoomState {
        let Ok(name) = RoomName::try_from("tick") else {
            panic!("valid room name");
        };
        RoomState::new(name, LivenessPolicy::default())
    }

    fn join(room: &mut RoomState, name: &str, now: Instant) -> Peer {
        let (handle, rx) = ConnectionHandle::channel(32);
        let id = handle.id();
        room.attach(handle);
        let text = json!({"type": "hello", "id": name}).to_string();
        room.handle_text(id, &text, now);
        let mut peer = Peer { id, rx };
        peer.drain();
        peer
    }

    fn update(room: &mut RoomState, peer: &Peer, state: Value, now: Instant) {
        let text = json!({"type": "update", "state": state}).to_string();
        room.handle_text(peer.id, &text, now);
    }

    #[test]
    fn vacant_room_tick_does_nothing() {
        let mut room = room();
        assert_eq!(room.tick(Instant::now()), TickReport::default());
    }

    #[test]
    fn tick_pings_then_sends_snapshot() {
        let mut room = room();
        let now = Instant::now();
        let mut a = join(&mut room, "A", now);
        let mut b = join(&mut room, "B", now);
        update(&mut room, &a, json!({"x": 1}), now);
        b.drain();

        let report = room.tick(now + Duration::from_secs(5));

        assert_eq!(report.pinged, 2);
        assert!(report.pruned.is_empty());
        assert_eq!(report.snapshot_recipients, 2);
        let expected = vec![
            json!({"type": "ping"}),
            json!({"type": "state", "clients": [{"x": 1}]}),
        ];
        assert_eq!(a.texts(), expected);
        assert_eq!(b.texts(), expected);
    }

    #[test]
    fn unidentified_connections_get_keepalive_only() {
        let mut room = room();
        let (handle, rx) = ConnectionHandle::channel(8);
        let id = handle.id();
        room.attach(handle);
        let mut lurker = Peer { id, rx };

        let report = room.tick(Instant::now());

        assert_eq!(report.pinged, 1);
        assert_eq!(report.snapshot_recipients, 0);
        assert_eq!(lurker.texts(), vec![json!({"type": "ping"})]);
        assert!(room.registry().is_empty());
    }

    #[test]
    fn idle_client_is_pruned_before_snapshot() {
        let mut room = room();
        let start = Instant::now();
        let mut a = join(&mut room, "A", start);
        let mut b = join(&mut room, "B", start);
        update(&mut room, &a, json!({"a": true}), start);
        b.drain();

        // B keeps talking, A goes silent.
        let later = start + Duration::from_secs(15);
        update(&mut room, &b, json!({"b": true}), later);
        a.drain();

        let report = room.tick(start + Duration::from_secs(21));

        let Ok(a_id) = ClientId::try_from("A") else {
            panic!("valid id");
        };
        assert_eq!(report.pruned, vec![a_id.clone()]);
        assert!(!room.registry().contains(&a_id));
        assert!(matches!(room.phase(a.id), Some(SessionPhase::Closed)));
        assert_eq!(room.stats().closing, 1);

        let a_frames = a.drain();
        assert!(a_frames.contains(&Outbound::Close(CloseReason::TIMEOUT)));

        assert_eq!(
            b.texts(),
            vec![
                json!({"type": "ping"}),
                json!({"type": "goodbye", "id": "A"}),
                json!({"type": "state", "clients": [{"b": true}]}),
            ]
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut room = room();
        let start = Instant::now();
        let _a = join(&mut room, "A", start);

        let report = room.tick(start + DEFAULT_IDLE_TIMEOUT);
        assert!(report.pruned.is_empty());

        let report = room.tick(start + DEFAULT_IDLE_TIMEOUT + Duration::from_millis(1));
        assert_eq!(report.pruned.len(), 1);
    }

    #[test]
    fn close_after_prune_does_not_repeat_goodbye() {
        let mut room = room();
        let start = Instant::now();
        let a = join(&mut room, "A", start);
        let mut b = join(&mut room, "B", start);
        let later = start + Duration::from_secs(20);
        update(&mut room, &b, json!({"b": 1}), later);

        room.tick(start + Duration::from_secs(21));
        b.drain();

        room.detach(a.id);

        assert!(b.texts().is_empty());
        assert!(room.phase(a.id).is_none());
    }

    #[test]
    fn client_that_never_updates_times_out() {
        let mut room = room();
        let start = Instant::now();
        let mut a = join(&mut room, "A", start);

        for secs in [5, 10, 15, 20] {
            let report = room.tick(start + Duration::from_secs(secs));
            assert!(report.pruned.is_empty());
        }
        let report = room.tick(start + Duration::from_secs(25));

        assert_eq!(report.pruned.len(), 1);
        assert!(a.drain().contains(&Outbound::Close(CloseReason::TIMEOUT)));
        assert!(room.registry().is_empty());
    }
}
