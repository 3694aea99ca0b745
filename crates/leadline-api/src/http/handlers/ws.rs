//! WebSocket feeds for live views.
//!
//! `/ws/sessions/{uid}` and `/ws/roster` open a sync subscription and push
//! every [`SyncSnapshot`](leadline_types::sync::SyncSnapshot) to the client
//! as a JSON text frame. Closing the socket drops the subscription handle,
//! which releases the underlying feed.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use leadline_types::sync::SubscriptionTarget;

use crate::state::AppState;

/// Incoming command from a WebSocket client.
///
/// Unknown or malformed messages are logged and ignored.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    /// Keep-alive ping. Server responds with `{"type":"pong"}`.
    Ping,
}

/// GET /ws/sessions/{uid}
pub async fn session_feed(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> impl IntoResponse {
    let target = SubscriptionTarget::session(uid);
    ws.on_upgrade(move |socket| handle_feed_socket(socket, state, target))
}

/// GET /ws/roster
pub async fn roster_feed(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_feed_socket(socket, state, SubscriptionTarget::Roster))
}

/// Multiplex snapshot pushes and client commands in one task.
async fn handle_feed_socket(socket: WebSocket, state: AppState, target: SubscriptionTarget) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut handle = state.engine.subscribe(target.clone());
    tracing::debug!(%target, "feed socket opened");

    // The current view first, so late joiners are not blank until the next change.
    let initial = handle.snapshot();
    if send_json(&mut ws_sender, &initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            snapshot = handle.changed() => {
                let Some(snapshot) = snapshot else {
                    // Subscription task ended (terminal status already sent).
                    break;
                };
                if send_json(&mut ws_sender, &snapshot).await.is_err() {
                    break;
                }
            }

            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        if process_command(&text, &mut ws_sender).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!("WebSocket receive error: {err}");
                        break;
                    }
                    // Binary, ping and pong protocol frames are handled by axum.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    handle.cancel();
    tracing::debug!(%target, "feed socket closed");
}

async fn send_json<T: serde::Serialize>(
    ws_sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    value: &T,
) -> Result<(), axum::Error> {
    match serde_json::to_string(value) {
        Ok(json) => ws_sender.send(Message::Text(json.into())).await,
        Err(err) => {
            tracing::warn!("Failed to serialize feed frame: {err}");
            Ok(())
        }
    }
}

/// Parse and answer a single command. Errors only when the socket is gone.
async fn process_command(
    text: &str,
    ws_sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
) -> Result<(), axum::Error> {
    match serde_json::from_str::<WsCommand>(text) {
        Ok(WsCommand::Ping) => {
            let pong = r#"{"type":"pong"}"#;
            ws_sender.send(Message::Text(pong.into())).await
        }
        Err(err) => {
            tracing::warn!(raw = %text, error = %err, "Ignoring malformed WebSocket command");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ping_command() {
        assert!(matches!(
            serde_json::from_str::<WsCommand>(r#"{"type":"ping"}"#),
            Ok(WsCommand::Ping)
        ));
        assert!(serde_json::from_str::<WsCommand>(r#"{"type":"cancel"}"#).is_err());
    }
}
