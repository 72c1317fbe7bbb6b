//! WebSocket upgrade handler and message dispatch.
//!
//! Each connected client receives:
//! 1. A full [`DeckSnapshot`](crate::snapshot::DeckSnapshot) on connect.
//! 2. Every [`WsMessage`] broadcast by cycles as they render.
//!
//! Clients can send `{"type":"generate","topic":"..."}` to start a cycle.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use flashgen::{GenerationError, run_cycle};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::api::AppState;
use crate::broadcast::WsMessage;

/// GET /ws: WebSocket upgrade handler.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(app): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app))
}

fn current_snapshot(app: &AppState) -> WsMessage {
    WsMessage::Snapshot {
        data: app.snapshot(),
    }
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, app: AppState) {
    let (mut sink, mut stream) = socket.split();

    // Subscribe before the initial snapshot so no render falls in between.
    let mut broadcast_rx = app.broadcast_tx.subscribe();

    if ws_send(&mut sink, &current_snapshot(&app)).await.is_err() {
        return;
    }

    debug!("WebSocket client connected");

    let resync_app = app.clone();
    let forward_task = tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(msg) => {
                    if ws_send(&mut sink, &msg).await.is_err() {
                        break; // Client disconnected.
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged by {n} messages, resending snapshot");
                    if ws_send(&mut sink, &current_snapshot(&resync_app))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => handle_client_message(&text, &app),
            Message::Close(_) => break,
            _ => {} // Ignore binary, ping, pong.
        }
    }

    debug!("WebSocket client disconnected");
    forward_task.abort();
}

/// Process a JSON message received from a client.
fn handle_client_message(text: &str, app: &AppState) {
    #[derive(serde::Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum ClientMessage {
        Generate {
            #[serde(default)]
            topic: String,
        },
    }

    let Ok(msg) = serde_json::from_str::<ClientMessage>(text) else {
        debug!("Ignoring malformed WebSocket message");
        return;
    };

    match msg {
        ClientMessage::Generate { topic } => {
            let app = app.clone();
            // The cycle outlives this message; results reach every client
            // through the broadcast channel.
            tokio::spawn(async move {
                let renderer = app.renderer();
                if let Err(GenerationError::Busy) =
                    run_cycle(app.generator.as_ref(), &renderer, &topic).await
                {
                    debug!("Ignoring WebSocket generate request: cycle in flight");
                }
            });
        }
    }
}

/// Serialize a `WsMessage` and send it over the WebSocket sink.
async fn ws_send(sink: &mut SplitSink<WebSocket, Message>, msg: &WsMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).unwrap_or_default();
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
