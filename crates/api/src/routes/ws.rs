//! WebSocket endpoint for real-time change events.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use domain::events::{self, EventEnvelope};
use serde_json::json;
use tracing::debug;

use crate::app::AppState;
use crate::services::Broadcaster;

/// Upgrade handler for GET /ws.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.broadcaster.clone()))
}

/// Pumps broadcast events to one connected client until either side
/// closes. Inbound frames are ignored; the socket is one-way.
async fn handle_socket(mut socket: WebSocket, broadcaster: Broadcaster) {
    let (observer_id, mut rx) = broadcaster.subscribe();
    debug!(observer_id, "WebSocket observer connected");

    let hello = EventEnvelope::new(
        events::CONNECTED,
        json!({ "message": "Connected to real-time updates" }),
    );
    if socket.send(Message::Text(hello.to_message())).await.is_err() {
        broadcaster.unsubscribe(observer_id);
        return;
    }

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Some(text) => {
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    broadcaster.unsubscribe(observer_id);
    debug!(observer_id, "WebSocket observer disconnected");
}
