use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use inkboard_shared::{ClientMessage, ServerMessage};

use crate::fanout::{broadcast_all, broadcast_except, deliver};
use crate::logic::apply_client_message;
use crate::state::AppState;

pub async fn healthz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let room = state.room.read().await;
    Json(json!({
        "status": "ok",
        "participants": room.presence.len(),
        "strokes": room.store.len(),
    }))
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let connection_id = Uuid::new_v4();

    let (init, snapshot) = {
        let mut room = state.room.write().await;
        let messages = room.connect(connection_id, tx);
        info!(conn = %connection_id, peers = room.peers.len(), "participant connected");
        messages
    };

    // The joining socket gets its identity and the join snapshot before
    // anything else; both go out directly, ahead of the relay task.
    for message in [init, snapshot] {
        match encode(&message) {
            Some(payload) => {
                if let Err(error) = socket_sender.send(Message::Binary(payload)).await {
                    warn!(conn = %connection_id, ?error, "handshake send failed");
                }
            }
            None => warn!(conn = %connection_id, "handshake serialize failed"),
        }
    }

    let roster = state.room.read().await.roster_update();
    broadcast_except(&state.room, connection_id, roster).await;

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Some(payload) = encode(&message) else {
                continue;
            };
            if socket_sender.send(Message::Binary(payload)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = socket_receiver.next().await {
        let client_message = match message {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(parsed) => parsed,
                Err(error) => {
                    debug!(conn = %connection_id, %error, "ignoring unparseable text frame");
                    continue;
                }
            },
            Message::Binary(data) => {
                match bincode::decode_from_slice::<ClientMessage, _>(
                    &data,
                    bincode::config::standard(),
                ) {
                    Ok((parsed, _)) => parsed,
                    Err(error) => {
                        debug!(conn = %connection_id, %error, "ignoring unparseable binary frame");
                        continue;
                    }
                }
            }
            Message::Close(_) => break,
            _ => continue,
        };

        let outbound = {
            let mut room = state.room.write().await;
            apply_client_message(&mut room, connection_id, client_message)
        };
        for (server_message, fanout) in outbound {
            deliver(&state.room, connection_id, server_message, fanout).await;
        }
    }

    let roster = {
        let mut room = state.room.write().await;
        room.disconnect(connection_id);
        info!(conn = %connection_id, peers = room.peers.len(), "participant disconnected");
        room.roster_update()
    };
    broadcast_all(&state.room, roster).await;
    send_task.abort();
}

fn encode(message: &ServerMessage) -> Option<Vec<u8>> {
    bincode::encode_to_vec(message, bincode::config::standard()).ok()
}
