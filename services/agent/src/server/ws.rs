//! Caller audio over a websocket: binary frames are 24 kHz mono PCM16
//! little-endian in both directions; `{"type":"interrupt"}` tells the
//! client to flush whatever agent audio it has queued.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use chrono::Utc;
use collections_core::{AgentAudio, CallerEvent};
use collections_native_utils::audio::{ToBinary, pcm16_from_le_bytes};
use serde::Deserialize;

use super::rooms::CallerLink;
use super::{ApiError, AppState};

pub const INTERRUPT_MESSAGE: &str = r#"{"type":"interrupt"}"#;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// `GET /ws?token=…`. The token names the room and the caller identity.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .ok_or_else(|| ApiError::Unauthorized("token is required".to_string()))?;
    let claims = state.tokens()?.verify(&token)?;
    let room = claims.video.room;
    let identity = claims.sub;

    let link = state.rooms.join(&room, &identity, Utc::now())?;
    tracing::info!("Caller {} joining room {}", identity, room);

    let rooms = state.rooms.clone();
    Ok(ws.on_upgrade(move |socket| async move {
        handle_socket(socket, link).await;
        rooms.leave(&room, &identity);
        tracing::info!("Caller {} left room {}", identity, room);
    }))
}

async fn handle_socket(mut socket: WebSocket, link: CallerLink) {
    let CallerLink {
        caller_tx,
        mut agent_rx,
    } = link;

    loop {
        tokio::select! {
            msg = socket.recv() => match msg {
                Some(Ok(Message::Binary(bytes))) => {
                    let pcm = pcm16_from_le_bytes(&bytes);
                    if caller_tx.send(CallerEvent::Audio(pcm)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::info!("WebSocket error: {}", e);
                    break;
                }
            },
            audio = agent_rx.recv() => {
                let message = match audio {
                    Some(AgentAudio::Pcm(pcm)) => Message::Binary(pcm.to_binary().into()),
                    Some(AgentAudio::Interrupt) => {
                        Message::Text(INTERRUPT_MESSAGE.to_string().into())
                    }
                    // The agent has finished with this call.
                    None => break,
                };
                if socket.send(message).await.is_err() {
                    break;
                }
            }
        }
    }

    if caller_tx.send(CallerEvent::Disconnected).await.is_err() {
        tracing::debug!("Agent already gone");
    }
    if let Err(e) = socket.send(Message::Close(None)).await {
        tracing::debug!("Close frame not sent: {}", e);
    }
}
