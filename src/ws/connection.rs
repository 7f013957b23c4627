//! Socket loop for a single WebSocket connection.
//!
//! The socket is split: a writer task drains the connection's outbox into
//! the sink, while this task forwards text frames to the room actor. When
//! either side ends, the room is told the connection closed.
//!
//! Every write is bounded by a deadline. A peer that stops reading cannot
//! hold the writer, and with it the room's record of the connection,
//! beyond that deadline.

use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};

use crate::domain::{ConnectionId, Outbound, Outbox};
use crate::room::Membership;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Forwards text frames to the room; binary frames are ignored.
/// - Writes frames queued by the room until it closes the connection.
/// - Gives up on the peer if a single write takes longer than
///   `write_timeout`.
/// - Always reports the close to the room exactly once.
pub async fn run_connection(socket: WebSocket, membership: Membership, write_timeout: Duration) {
    let Membership {
        room,
        connection_id,
        outbox,
    } = membership;
    let (ws_tx, mut ws_rx) = socket.split();
    let mut writer = tokio::spawn(write_outbox(connection_id, outbox, ws_tx, write_timeout));
    tracing::debug!(room = %room.name(), %connection_id, "ws connection opened");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if room.inbound(connection_id, text).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(%connection_id, error = %err, "ws read failed");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
            // The room closed us (timeout, takeover, shutdown) or the sink failed.
            _ = &mut writer => break,
        }
    }

    let _ = room.detach(connection_id).await;
    writer.abort();
    tracing::debug!(room = %room.name(), %connection_id, "ws connection closed");
}

/// Writes queued frames to the socket until a close frame is written, the
/// sink fails or stalls, or the room drops the connection.
async fn write_outbox(
    connection_id: ConnectionId,
    mut outbox: Outbox,
    mut sink: SplitSink<WebSocket, Message>,
    write_timeout: Duration,
) {
    while let Some(frame) = outbox.recv().await {
        match frame {
            Outbound::Text(text) => {
                if !write(connection_id, &mut sink, Message::Text(text), write_timeout).await {
                    return;
                }
            }
            Outbound::Close(reason) => {
                let close = CloseFrame {
                    code: reason.code,
                    reason: Utf8Bytes::from_static(reason.reason),
                };
                write(connection_id, &mut sink, Message::Close(Some(close)), write_timeout).await;
                return;
            }
        }
    }
    let _ = tokio::time::timeout(write_timeout, sink.close()).await;
}

/// Sends one message, returning `false` if the sink failed or stalled.
async fn write(
    connection_id: ConnectionId,
    sink: &mut SplitSink<WebSocket, Message>,
    message: Message,
    write_timeout: Duration,
) -> bool {
    match tokio::time::timeout(write_timeout, sink.send(message)).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::debug!(%connection_id, error = %err, "ws write failed");
            false
        }
        Err(_) => {
            tracing::warn!(
                %connection_id,
                timeout_ms = write_timeout.as_millis() as u64,
                "ws write stalled, dropping connection"
            );
            false
        }
    }
}
