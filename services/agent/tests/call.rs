//! A full hosted call over a real socket, with a scripted realtime backend.

use std::sync::Arc;
use std::future::IntoFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use collections_agent::config::Config;
use collections_agent::server::token::TokenIssuer;
use collections_agent::server::{AppState, router};
use collections_agent::worker::Connect;
use collections_core::{AgentKind, Prompts};
use collections_native_utils::audio::encode_i16;
use futures_util::{SinkExt, StreamExt};
use openai_realtime::types::audio::Base64EncodedAudioBytes;
use openai_realtime::types::{Item, ResponseConfig, ServerEvent, Session};
use openai_realtime::{RealtimeClient, ServerRx};
use serde_json::json;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;

const GREETING_PCM: [i16; 3] = [100, -100, 200];

/// Answers every scripted response with a short burst of audio.
struct Scripted {
    events: broadcast::Sender<ServerEvent>,
    appended: Arc<AtomicUsize>,
}

#[async_trait]
impl RealtimeClient for Scripted {
    async fn update_session(&mut self, _session: Session) -> Result<()> {
        Ok(())
    }

    async fn append_input_audio_buffer(
        &mut self,
        _audio: Base64EncodedAudioBytes,
    ) -> Result<()> {
        self.appended.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_conversation_item(&mut self, _item: Item) -> Result<()> {
        Ok(())
    }

    async fn create_response(&mut self) -> Result<()> {
        Ok(())
    }

    async fn create_response_with(&mut self, _config: ResponseConfig) -> Result<()> {
        let delta: ServerEvent = serde_json::from_value(json!({
            "type": "response.audio.delta",
            "event_id": "evt_1",
            "response_id": "resp_1",
            "item_id": "item_1",
            "output_index": 0,
            "content_index": 0,
            "delta": encode_i16(&GREETING_PCM)
        }))?;
        let _ = self.events.send(delta);
        Ok(())
    }

    async fn server_events(&mut self) -> Result<ServerRx> {
        Ok(self.events.subscribe())
    }
}

struct ScriptedConnect {
    appended: Arc<AtomicUsize>,
}

#[async_trait]
impl Connect for ScriptedConnect {
    async fn connect(&self) -> Result<Box<dyn RealtimeClient>> {
        let (events, _) = broadcast::channel(16);
        Ok(Box::new(Scripted {
            events,
            appended: self.appended.clone(),
        }))
    }
}

async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn caller_hears_greeting_and_is_heard() {
    // Arrange
    let appended = Arc::new(AtomicUsize::new(0));
    let config = Config::from_lookup(|_| None).unwrap();
    let state = AppState::new(Arc::new(config), Prompts::builtin())
        .with_connector(Arc::new(ScriptedConnect {
            appended: appended.clone(),
        }))
        .with_tokens(TokenIssuer::new("APIkey", "secret"));
    state.open_room("e2e", AgentKind::Assistant, None).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(axum::serve(listener, router(state.clone())).into_future());

    let issuer = TokenIssuer::new("APIkey", "secret");
    let token = issuer.issue("caller", "e2e", &json!({}), Utc::now()).unwrap();
    let url = format!("ws://{addr}/ws?token={token}");

    // Act
    let (mut socket, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
    socket
        .send(Message::Binary(vec![0u8; 960].into()))
        .await
        .unwrap();
    let first = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    // Assert
    let expected: Vec<u8> = GREETING_PCM.iter().flat_map(|s| s.to_le_bytes()).collect();
    assert_eq!(first.into_data().to_vec(), expected);
    assert!(wait_until(|| appended.load(Ordering::SeqCst) > 0).await);
    assert_eq!(state.rooms.get("e2e").unwrap().participants.len(), 2);

    // A second caller is turned away while the first is connected.
    let other = issuer.issue("intruder", "e2e", &json!({}), Utc::now()).unwrap();
    assert!(
        tokio_tungstenite::connect_async(format!("ws://{addr}/ws?token={other}"))
            .await
            .is_err()
    );

    socket.close(None).await.unwrap();
    assert!(wait_until(|| state.rooms.get("e2e").is_none()).await);
}

#[tokio::test]
async fn bad_token_is_rejected_before_upgrade() {
    let config = Config::from_lookup(|_| None).unwrap();
    let state = AppState::new(Arc::new(config), Prompts::builtin())
        .with_tokens(TokenIssuer::new("APIkey", "secret"));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(axum::serve(listener, router(state)).into_future());

    let forged = TokenIssuer::new("APIkey", "guess")
        .issue("caller", "e2e", &json!({}), Utc::now())
        .unwrap();
    let url = format!("ws://{addr}/ws?token={forged}");
    let result = tokio_tungstenite::connect_async(url).await;
    assert!(result.is_err());
}
