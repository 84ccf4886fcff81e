//! WebSocket transport for game connections.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /play`
//! 2. Server spawns three tasks per connection:
//!    - Bridge task: authentication, matchmaking, then the game itself
//!    - Send task: the only writer to the socket, draining the outbound queue
//!    - This handler: reads frames and forwards text into the bridge
//! 3. Client sends `auth` as its first command
//! 4. On disconnect the inbound queue closes, which the bridge treats as the
//!    client leaving
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/play');
//! ws.onopen = () => ws.send(JSON.stringify({type: "auth", command_id: 1, ticket}));
//! ws.onmessage = (event) => {
//!   const message = JSON.parse(event.data);
//!   if (message.type === "start_round") showHand(message.hand);
//! };
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use hearts::bridge::{ConnectionEnd, ServerMessage};
use log::{error, warn};
use std::time::Duration;
use tokio::{sync::mpsc, task::JoinError};

use super::{AppState, request_id::RequestId};
use crate::{logging::log_connection_event, metrics};

/// Frames buffered between the socket reader and the bridge
const INBOUND_CAPACITY: usize = 32;

/// How long queued messages may take to flush once the connection ends
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Upgrade HTTP connection to a game connection.
///
/// Authentication happens in-band, so the upgrade itself always succeeds.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    request_id: RequestId,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, request_id, state))
}

fn end_label(end: &Result<ConnectionEnd, JoinError>) -> &'static str {
    match end {
        Ok(ConnectionEnd::Disconnected) => "disconnected",
        Ok(ConnectionEnd::Cancelled) => "cancelled",
        Ok(ConnectionEnd::GameClosed) => "game_closed",
        Ok(ConnectionEnd::Rejected(_)) => "rejected",
        Err(_) => "failed",
    }
}

/// Handle an established WebSocket connection.
///
/// # Arguments
///
/// - `socket`: The WebSocket connection
/// - `request_id`: ID of the upgrade request, reused as the connection ID
/// - `state`: Shared application state
async fn handle_socket(socket: WebSocket, request_id: RequestId, state: AppState) {
    let connection_id = request_id.as_str();
    let (mut sender, mut receiver) = socket.split();

    log_connection_event(connection_id, "opened", None);
    metrics::websocket_connection_opened();

    let (inbound_tx, inbound_rx) = mpsc::channel::<String>(INBOUND_CAPACITY);
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();

    let bridge = state.bridge();
    let mut serve_task = tokio::spawn(async move { bridge.serve(inbound_rx, outbound_tx).await });

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            metrics::websocket_messages_sent();
        }
        let _ = sender.close().await;
    });

    let end = loop {
        tokio::select! {
            end = &mut serve_task => break end,

            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    metrics::websocket_messages_received();
                    // A full buffer pushes back on the socket.
                    if inbound_tx.send(text.as_str().to_owned()).await.is_err() {
                        break (&mut serve_task).await;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    drop(inbound_tx);
                    break (&mut serve_task).await;
                }
                Some(Err(e)) => {
                    warn!("WebSocket error on {}: {}", connection_id, e);
                    drop(inbound_tx);
                    break (&mut serve_task).await;
                }
                Some(Ok(_)) => {}
            },
        }
    };

    if let Err(e) = &end {
        error!("Connection {} failed: {}", connection_id, e);
    }
    if tokio::time::timeout(FLUSH_TIMEOUT, &mut send_task).await.is_err() {
        warn!("Connection {} didn't flush in time", connection_id);
        send_task.abort();
    }

    let label = end_label(&end);
    let detail = match &end {
        Ok(ConnectionEnd::Rejected(reason)) => format!("{label}: {reason}"),
        _ => label.to_string(),
    };
    log_connection_event(connection_id, "closed", Some(&detail));
    metrics::websocket_connection_closed(label);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_labels() {
        assert_eq!(end_label(&Ok(ConnectionEnd::Cancelled)), "cancelled");
        assert_eq!(
            end_label(&Ok(ConnectionEnd::Rejected("full".to_string()))),
            "rejected"
        );
    }
}
