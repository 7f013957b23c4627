//! Per-room connection registry.
//!
//! [`ConnectionRegistry`] maps each identified participant to its session.
//! It is owned by exactly one room actor and never shared, so it needs no
//! internal locking; every method is atomic with respect to the others
//! because the actor calls them one at a time.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use super::{ClientId, ClientSession, ConnectionHandle, ConnectionId, StatePayload};

/// Live participants of one room, keyed by [`ClientId`].
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    clients: HashMap<ClientId, ClientSession>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh session for `id` with no state.
    ///
    /// A later registration for the same id wins. The superseded session,
    /// if any, is returned so the caller can deal with its connection.
    pub fn register(
        &mut self,
        id: ClientId,
        connection: ConnectionHandle,
        now: Instant,
    ) -> Option<ClientSession> {
        let session = ClientSession::new(id.clone(), connection, now);
        self.clients.insert(id, session)
    }

    /// Refreshes `last_seen` and, when given, replaces the stored state.
    ///
    /// Returns `false` if `id` is not registered.
    pub fn touch(&mut self, id: &ClientId, state: Option<StatePayload>, now: Instant) -> bool {
        let Some(session) = self.clients.get_mut(id) else {
            return false;
        };
        session.last_seen = now;
        if let Some(state) = state {
            session.state = Some(state);
        }
        true
    }

    /// Removes and returns the session for `id`. Idempotent.
    pub fn remove(&mut self, id: &ClientId) -> Option<ClientSession> {
        self.clients.remove(id)
    }

    /// Removes the session for `id` only if it is still bound to
    /// `connection`.
    ///
    /// A connection whose id was taken over by a newer connection must not
    /// evict the newcomer when it finally closes.
    pub fn remove_owned(
        &mut self,
        id: &ClientId,
        connection: ConnectionId,
    ) -> Option<ClientSession> {
        match self.clients.get(id) {
            Some(session) if session.connection_id() == connection => self.clients.remove(id),
            _ => None,
        }
    }

    /// Returns every stored state, skipping clients that have not sent
    /// `update` yet. Order carries no meaning.
    #[must_use]
    pub fn snapshot(&self) -> Vec<StatePayload> {
        self.clients
            .values()
            .filter_map(|session| session.state.clone())
            .collect()
    }

    /// Returns the ids whose last activity is strictly older than
    /// `threshold` at `now`.
    #[must_use]
    pub fn idle_since(&self, now: Instant, threshold: Duration) -> Vec<ClientId> {
        self.clients
            .values()
            .filter(|session| now.saturating_duration_since(session.last_seen) > threshold)
            .map(|session| session.id.clone())
            .collect()
    }

    /// Returns the session for `id`, if registered.
    #[must_use]
    pub fn get(&self, id: &ClientId) -> Option<&ClientSession> {
        self.clients.get(id)
    }

    /// Returns `true` if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &ClientId) -> bool {
        self.clients.contains_key(id)
    }

    /// Iterates over all sessions.
    pub fn sessions(&self) -> impl Iterator<Item = &ClientSession> {
        self.clients.values()
    }

    /// Removes every session, returning them.
    pub fn drain(&mut self) -> impl Iterator<Item = ClientSession> + '_ {
        self.clients.drain().map(|(_, session)| session)
    }

    /// Returns the number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if no client is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(name: &str) -> ClientId {
        let Ok(id) = ClientId::try_from(name) else {
            panic!("valid client id");
        };
        id
    }

    fn handle() -> ConnectionHandle {
        ConnectionHandle::channel(8).0
    }

    #[test]
    fn register_starts_without_state() {
        let mut reg = ConnectionRegistry::new();
        let now = Instant::now();
        assert!(reg.register(client("a"), handle(), now).is_none());
        let Some(session) = reg.get(&client("a")) else {
            panic!("session should exist");
        };
        assert!(session.state.is_none());
        assert_eq!(session.last_seen, now);
        assert!(reg.snapshot().is_empty());
    }

    #[test]
    fn register_twice_overwrites_and_returns_previous() {
        let mut reg = ConnectionRegistry::new();
        let now = Instant::now();
        let first = handle();
        let first_id = first.id();
        reg.register(client("a"), first, now);
        reg.touch(&client("a"), Some(json!({"x": 1}).into()), now);

        let Some(previous) = reg.register(client("a"), handle(), now) else {
            panic!("previous session should be returned");
        };
        assert_eq!(previous.connection_id(), first_id);
        assert_eq!(reg.len(), 1);
        assert!(reg.snapshot().is_empty());
    }

    #[test]
    fn touch_unknown_client_returns_false() {
        let mut reg = ConnectionRegistry::new();
        assert!(!reg.touch(&client("ghost"), None, Instant::now()));
        assert!(reg.is_empty());
    }

    #[test]
    fn touch_without_state_keeps_previous_state() {
        let mut reg = ConnectionRegistry::new();
        let now = Instant::now();
        reg.register(client("a"), handle(), now);
        assert!(reg.touch(&client("a"), Some(json!({"x": 1}).into()), now));
        let later = now + Duration::from_secs(3);
        assert!(reg.touch(&client("a"), None, later));

        let Some(session) = reg.get(&client("a")) else {
            panic!("session should exist");
        };
        assert_eq!(session.last_seen, later);
        assert_eq!(session.state, Some(json!({"x": 1}).into()));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut reg = ConnectionRegistry::new();
        reg.register(client("a"), handle(), Instant::now());
        assert!(reg.remove(&client("a")).is_some());
        assert!(reg.remove(&client("a")).is_none());
        assert!(!reg.contains(&client("a")));
    }

    #[test]
    fn remove_owned_ignores_foreign_connection() {
        let mut reg = ConnectionRegistry::new();
        let old = handle();
        let old_id = old.id();
        let now = Instant::now();
        reg.register(client("a"), old, now);
        let replacement = handle();
        let replacement_id = replacement.id();
        reg.register(client("a"), replacement, now);

        assert!(reg.remove_owned(&client("a"), old_id).is_none());
        assert!(reg.contains(&client("a")));
        assert!(reg.remove_owned(&client("a"), replacement_id).is_some());
        assert!(reg.is_empty());
    }

    #[test]
    fn snapshot_skips_clients_without_state() {
        let mut reg = ConnectionRegistry::new();
        let now = Instant::now();
        reg.register(client("a"), handle(), now);
        reg.register(client("b"), handle(), now);
        reg.touch(&client("a"), Some(json!({"x": 1}).into()), now);

        assert_eq!(reg.snapshot(), vec![StatePayload::new(json!({"x": 1}))]);
    }

    #[test]
    fn idle_since_is_strictly_greater_than_threshold() {
        let mut reg = ConnectionRegistry::new();
        let start = Instant::now();
        reg.register(client("stale"), handle(), start);
        reg.register(client("edge"), handle(), start + Duration::from_secs(5));
        reg.register(client("fresh"), handle(), start + Duration::from_secs(20));

        let now = start + Duration::from_secs(25);
        let idle = reg.idle_since(now, Duration::from_secs(20));
        assert_eq!(idle, vec![client("stale")]);
    }
}
