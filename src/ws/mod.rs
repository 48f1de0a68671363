//! WebSocket chat bridge
//!
//! Each socket is one chat participant, named by the `nick` query parameter.
//! Lines they send go to the game; they receive every channel line plus the
//! private lines addressed to them.

pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub nick: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let nick = params
        .nick
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && !n.contains(char::is_whitespace));
    let Some(nick) = nick else {
        tracing::warn!("WebSocket connection refused: missing or invalid nick");
        return (StatusCode::BAD_REQUEST, "a single-word nick is required").into_response();
    };

    tracing::info!("WebSocket connection request from {}", nick);
    ws.on_upgrade(move |socket| handle_socket(socket, nick, state))
}

async fn send_json(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            true
        }
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, nick: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before greeting so nothing said in between is missed
    let mut broadcast_rx = state.subscribe();

    let welcome = ServerMessage::welcome(&nick, &state.channel().await);
    if !send_json(&mut sender, &welcome).await {
        tracing::error!("Failed to send welcome message to {}", nick);
        return;
    }

    loop {
        tokio::select! {
            broadcast_msg = broadcast_rx.recv() => {
                match broadcast_msg {
                    Ok(msg) if msg.is_visible_to(&nick) => {
                        if !send_json(&mut sender, &msg).await {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("{} lagged behind, {} lines dropped", nick, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received from {}: {}", nick, text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(client_msg, &nick, &state).await
                                {
                                    if !send_json(&mut sender, &response).await {
                                        tracing::error!("Failed to send response to {}", nick);
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::warn!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                let _ = send_json(&mut sender, &error).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed by {}", nick);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    tracing::info!("WebSocket connection closed for {}", nick);
}
