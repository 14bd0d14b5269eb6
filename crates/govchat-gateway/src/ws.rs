// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime notifier: best-effort typing broadcasts and canned-reply echo.
//!
//! This channel has no ordering relationship to the governance pipeline and
//! nothing here is submitted for policy evaluation.
//!
//! Client -> Server (JSON):
//! ```json
//! {"type": "typing"}
//! {"type": "chat_message", "message": "hello"}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"type": "user_typing"}
//! {"type": "chat_message", "message": "Bot: ..."}
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use govchat_completion::CannedResponder;

use crate::server::AppState;

/// Artificial thinking delay before the echoed bot reply. A UX affordance,
/// not a correctness requirement.
const REPLY_DELAY: Duration = Duration::from_secs(1);

/// WebSocket message from a client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsIncoming {
    /// The user is typing; broadcast to everyone else.
    Typing,
    /// A chat message to echo back with a canned bot reply.
    ChatMessage { message: String },
}

/// Registry of connected websocket clients.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    senders: Arc<DashMap<String, mpsc::Sender<String>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connected clients.
    pub fn connected(&self) -> usize {
        self.senders.len()
    }

    fn register(&self, id: String, tx: mpsc::Sender<String>) {
        self.senders.insert(id, tx);
    }

    fn unregister(&self, id: &str) {
        self.senders.remove(id);
    }

    /// Sends to one client; a full or closed channel drops the message.
    async fn send_to(&self, id: &str, payload: String) {
        if let Some(tx) = self.senders.get(id).map(|entry| entry.clone()) {
            let _ = tx.send(payload).await;
        }
    }

    /// Broadcasts to every client except `exclude`. Best effort: slow or
    /// gone clients are skipped.
    async fn broadcast_except(&self, exclude: &str, payload: &str) {
        let targets: Vec<mpsc::Sender<String>> = self
            .senders
            .iter()
            .filter(|entry| entry.key() != exclude)
            .map(|entry| entry.value().clone())
            .collect();
        for tx in targets {
            let _ = tx.send(payload.to_string()).await;
        }
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handles an individual WebSocket connection.
///
/// Spawns a sender task forwarding queued payloads to the client, then reads
/// incoming events until the client disconnects.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let ws_id = uuid::Uuid::new_v4().to_string();

    let (tx, mut rx) = mpsc::channel::<String>(64);
    state.notifier.register(ws_id.clone(), tx);
    tracing::debug!(ws_id = %ws_id, "websocket client connected");

    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => {
                let text_str: &str = &text;
                let incoming: WsIncoming = match serde_json::from_str(text_str) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!("invalid websocket message: {e}");
                        continue;
                    }
                };

                match incoming {
                    WsIncoming::Typing => {
                        let payload = serde_json::json!({"type": "user_typing"}).to_string();
                        state.notifier.broadcast_except(&ws_id, &payload).await;
                    }
                    WsIncoming::ChatMessage { message } => {
                        // Echo a canned reply back to the sender after the
                        // fixed thinking delay; the sender task outlives
                        // this loop iteration.
                        let notifier = state.notifier.clone();
                        let ws_id = ws_id.clone();
                        tokio::spawn(async move {
                            tokio::time::sleep(REPLY_DELAY).await;
                            let reply = CannedResponder::reply(&message);
                            let payload = serde_json::json!({
                                "type": "chat_message",
                                "message": format!("Bot: {reply}"),
                            })
                            .to_string();
                            notifier.send_to(&ws_id, payload).await;
                        });
                    }
                }
            }
            Message::Close(_) => break,
            _ => {} // Ignore binary and ping/pong frames.
        }
    }

    state.notifier.unregister(&ws_id);
    sender_task.abort();
    tracing::debug!(ws_id = %ws_id, "websocket client disconnected");
}
