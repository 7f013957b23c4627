//! Best-effort fan-out of server messages.
//!
//! A message is encoded once and the resulting frame is shared by every
//! recipient. Delivery failures are logged and skipped; they never stop
//! the remaining sends and are never reported to the caller as errors.

use crate::domain::{ClientId, ConnectionHandle, ConnectionRegistry};
use crate::ws::messages::ServerMessage;

/// Sends `message` to every registered client except `except`.
///
/// Returns the number of connections the frame was queued on.
pub fn broadcast(
    registry: &ConnectionRegistry,
    message: &ServerMessage,
    except: Option<&ClientId>,
) -> usize {
    let frame = match message.encode() {
        Ok(frame) => frame,
        Err(err) => {
            tracing::error!(error = %err, "failed to encode broadcast message");
            return 0;
        }
    };

    let mut delivered = 0;
    for session in registry.sessions() {
        if except.is_some_and(|skip| *skip == session.id) {
            continue;
        }
        match session.connection.send(frame.clone()) {
            Ok(()) => delivered += 1,
            Err(err) => {
                tracing::debug!(
                    client_id = %session.id,
                    connection_id = %session.connection_id(),
                    error = %err,
                    "broadcast delivery skipped"
                );
            }
        }
    }
    delivered
}

/// Sends `message` to a single connection. Returns whether it was queued.
pub fn send_to(connection: &ConnectionHandle, message: &ServerMessage) -> bool {
    let frame = match message.encode() {
        Ok(frame) => frame,
        Err(err) => {
            tracing::error!(error = %err, "failed to encode direct message");
            return false;
        }
    };
    match connection.send(frame) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %err,
                "direct delivery skipped"
            );
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Outbound, Outbox};
    use tokio::time::Instant;

    fn client(name: &str) -> ClientId {
        let Ok(id) = ClientId::try_from(name) else {
            panic!("valid client id");
        };
        id
    }

    fn join(registry: &mut ConnectionRegistry, name: &str, capacity: usize) -> Outbox {
        let (handle, rx) = ConnectionHandle::channel(capacity);
        registry.register(client(name), handle, Instant::now());
        rx
    }

    fn received(rx: &mut Outbox) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            if let Outbound::Text(text) = frame {
                frames.push(text.as_str().to_string());
            }
        }
        frames
    }

    #[test]
    fn skips_excepted_client() {
        let mut reg = ConnectionRegistry::new();
        let mut a = join(&mut reg, "a", 8);
        let mut b = join(&mut reg, "b", 8);

        let count = broadcast(&reg, &ServerMessage::Ping, Some(&client("a")));

        assert_eq!(count, 1);
        assert!(received(&mut a).is_empty());
        assert_eq!(received(&mut b), vec![r#"{"type":"ping"}"#.to_string()]);
    }

    #[test]
    fn failed_recipient_does_not_block_others() {
        let mut reg = ConnectionRegistry::new();
        let mut a = join(&mut reg, "a", 8);
        let dead = join(&mut reg, "dead", 8);
        drop(dead);
        let mut full = join(&mut reg, "full", 1);
        let mut c = join(&mut reg, "c", 8);

        broadcast(&reg, &ServerMessage::Ping, None);
        let count = broadcast(&reg, &ServerMessage::Ping, None);

        // "full" accepted only the first ping, "dead" nothing.
        assert_eq!(count, 2);
        assert_eq!(received(&mut a).len(), 2);
        assert_eq!(received(&mut c).len(), 2);
        assert_eq!(received(&mut full).len(), 1);
    }

    #[test]
    fn empty_registry_delivers_nothing() {
        let reg = ConnectionRegistry::new();
        assert_eq!(broadcast(&reg, &ServerMessage::Ping, None), 0);
    }

    #[test]
    fn send_to_reports_closed_connection() {
        let (handle, rx) = ConnectionHandle::channel(4);
        assert!(send_to(&handle, &ServerMessage::Ping));
        drop(rx);
        assert!(!send_to(&handle, &ServerMessage::Ping));
    }
}
