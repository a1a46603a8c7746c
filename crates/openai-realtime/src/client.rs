use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use openai_realtime_types::audio::Base64EncodedAudioBytes;
use openai_realtime_types::events::client::{
    ConversationItemCreateEvent, InputAudioBufferAppendEvent, ResponseCreateEvent,
    SessionUpdateEvent,
};
use openai_realtime_types::{ClientEvent, Item, ResponseConfig, ServerEvent, Session};
use tokio_tungstenite::tungstenite::Message;

use crate::client::stats::Stats;

pub(crate) mod config;
pub(crate) mod consts;
pub(crate) mod stats;
mod utils;

pub type ClientTx = tokio::sync::mpsc::Sender<ClientEvent>;
type ServerTx = tokio::sync::broadcast::Sender<ServerEvent>;
pub type ServerRx = tokio::sync::broadcast::Receiver<ServerEvent>;

/// The operations an agent session needs from a realtime connection.
#[async_trait]
pub trait RealtimeClient: Send {
    async fn update_session(&mut self, session: Session) -> Result<()>;

    async fn append_input_audio_buffer(&mut self, audio: Base64EncodedAudioBytes) -> Result<()>;

    async fn create_conversation_item(&mut self, item: Item) -> Result<()>;

    async fn create_response(&mut self) -> Result<()>;

    /// `response.create` with per-response overrides, e.g. a scripted greeting.
    async fn create_response_with(&mut self, config: ResponseConfig) -> Result<()>;

    async fn server_events(&mut self) -> Result<ServerRx>;

    /// Token usage summed over the connection so far, when the client keeps it.
    fn stats(&self) -> Option<Stats> {
        None
    }
}

#[async_trait]
impl<T: RealtimeClient + ?Sized> RealtimeClient for Box<T> {
    async fn update_session(&mut self, session: Session) -> Result<()> {
        (**self).update_session(session).await
    }

    async fn append_input_audio_buffer(&mut self, audio: Base64EncodedAudioBytes) -> Result<()> {
        (**self).append_input_audio_buffer(audio).await
    }

    async fn create_conversation_item(&mut self, item: Item) -> Result<()> {
        (**self).create_conversation_item(item).await
    }

    async fn create_response(&mut self) -> Result<()> {
        (**self).create_response().await
    }

    async fn create_response_with(&mut self, config: ResponseConfig) -> Result<()> {
        (**self).create_response_with(config).await
    }

    async fn server_events(&mut self) -> Result<ServerRx> {
        (**self).server_events().await
    }

    fn stats(&self) -> Option<Stats> {
        (**self).stats()
    }
}

pub struct Client {
    capacity: usize,
    config: config::Config,
    c_tx: Option<ClientTx>,
    s_tx: Option<ServerTx>,
    stats: Arc<Mutex<Stats>>,
}

impl Client {
    fn new(capacity: usize, config: config::Config) -> Self {
        Self {
            capacity,
            config,
            c_tx: None,
            s_tx: None,
            stats: Arc::new(Mutex::new(Stats::new())),
        }
    }

    async fn connect(&mut self) -> Result<()> {
        if self.c_tx.is_some() {
            return Err(anyhow::anyhow!("already connected"));
        }

        let request = utils::build_request(&self.config)?;
        let (ws_stream, _) = tokio_tungstenite::connect_async(request).await?;
        let (mut write, mut read) = ws_stream.split();

        let (c_tx, mut c_rx) = tokio::sync::mpsc::channel::<ClientEvent>(self.capacity);
        let (s_tx, _) = tokio::sync::broadcast::channel(self.capacity);

        self.c_tx = Some(c_tx);
        self.s_tx = Some(s_tx.clone());

        // Writer: runs until every sender is dropped, then closes the socket.
        tokio::spawn(async move {
            while let Some(event) = c_rx.recv().await {
                match serde_json::to_string(&event) {
                    Ok(text) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            tracing::error!("failed to send message: {}", e);
                        }
                    }
                    Err(e) => {
                        tracing::error!("failed to serialize event: {}", e);
                    }
                }
            }
            if let Err(e) = write.send(Message::Close(None)).await {
                tracing::debug!("failed to send close frame: {}", e);
            }
        });

        let stats = self.stats.clone();
        tokio::spawn(async move {
            let mut close_reason = None;
            while let Some(message) = read.next().await {
                let message = match message {
                    Err(e) => {
                        tracing::error!("failed to read message: {}", e);
                        close_reason = Some(e.to_string());
                        break;
                    }
                    Ok(message) => message,
                };
                match message {
                    Message::Text(text) => {
                        let event = match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => event,
                            Err(e) => {
                                tracing::error!(
                                    "failed to deserialize event: {}, text=> {:?}",
                                    e,
                                    text
                                );
                                continue;
                            }
                        };

                        if let ServerEvent::ResponseDone(response) = &event {
                            if let Some(usage) = response.response().usage() {
                                match stats.lock() {
                                    Ok(mut guard) => guard.update_usage(
                                        usage.total_tokens(),
                                        usage.input_tokens(),
                                        usage.output_tokens(),
                                    ),
                                    Err(_) => tracing::error!("failed to update stats"),
                                }
                                tracing::debug!(
                                    "total_tokens: {}, input_tokens: {}, output_tokens: {}",
                                    usage.total_tokens(),
                                    usage.input_tokens(),
                                    usage.output_tokens()
                                );
                            }
                        }

                        if !matches!(event, ServerEvent::ResponseAudioDelta(_)) {
                            tracing::debug!("received event: {:?}", event_name(&event));
                        }

                        // No subscribers is not an error; the session may not be listening yet.
                        let _ = s_tx.send(event);
                    }
                    Message::Binary(bin) => {
                        tracing::warn!("unexpected binary message: {} bytes", bin.len());
                    }
                    Message::Close(reason) => {
                        tracing::info!("connection closed: {:?}", reason);
                        close_reason = reason.map(|v| v.reason.to_string());
                        break;
                    }
                    _ => {}
                }
            }
            let _ = s_tx.send(ServerEvent::Close {
                reason: close_reason,
            });
        });
        Ok(())
    }

    async fn send_client_event(&mut self, event: ClientEvent) -> Result<()> {
        match self.c_tx {
            Some(ref tx) => {
                tx.send(event).await?;
                Ok(())
            }
            None => Err(anyhow::anyhow!("not connected")),
        }
    }
}

fn event_name(event: &ServerEvent) -> &'static str {
    match event {
        ServerEvent::Close { .. } => "close",
        ServerEvent::Error(_) => "error",
        ServerEvent::SessionCreated(_) => "session.created",
        ServerEvent::SessionUpdated(_) => "session.updated",
        ServerEvent::InputAudioBufferSpeechStarted(_) => "input_audio_buffer.speech_started",
        ServerEvent::InputAudioBufferSpeechStopped(_) => "input_audio_buffer.speech_stopped",
        ServerEvent::InputAudioTranscriptionCompleted(_) => "input_audio_transcription.completed",
        ServerEvent::InputAudioTranscriptionFailed(_) => "input_audio_transcription.failed",
        ServerEvent::ResponseCreated(_) => "response.created",
        ServerEvent::ResponseDone(_) => "response.done",
        ServerEvent::ResponseOutputItemDone(_) => "response.output_item.done",
        ServerEvent::ResponseTextDone(_) => "response.text.done",
        ServerEvent::ResponseAudioTranscriptDone(_) => "response.audio_transcript.done",
        ServerEvent::ResponseAudioDelta(_) => "response.audio.delta",
        ServerEvent::ResponseAudioDone(_) => "response.audio.done",
        ServerEvent::ResponseFunctionCallArgumentsDone(_) => {
            "response.function_call_arguments.done"
        }
        ServerEvent::Unknown => "unknown",
    }
}

#[async_trait]
impl RealtimeClient for Client {
    async fn update_session(&mut self, session: Session) -> Result<()> {
        self.send_client_event(ClientEvent::SessionUpdate(SessionUpdateEvent::new(session)))
            .await
    }

    async fn append_input_audio_buffer(&mut self, audio: Base64EncodedAudioBytes) -> Result<()> {
        self.send_client_event(ClientEvent::InputAudioBufferAppend(
            InputAudioBufferAppendEvent::new(audio),
        ))
        .await
    }

    async fn create_conversation_item(&mut self, item: Item) -> Result<()> {
        self.send_client_event(ClientEvent::ConversationItemCreate(
            ConversationItemCreateEvent::new(item),
        ))
        .await
    }

    async fn create_response(&mut self) -> Result<()> {
        self.send_client_event(ClientEvent::ResponseCreate(ResponseCreateEvent::new()))
            .await
    }

    async fn create_response_with(&mut self, config: ResponseConfig) -> Result<()> {
        self.send_client_event(ClientEvent::ResponseCreate(
            ResponseCreateEvent::new().with_config(config),
        ))
        .await
    }

    async fn server_events(&mut self) -> Result<ServerRx> {
        match self.s_tx {
            Some(ref tx) => Ok(tx.subscribe()),
            None => Err(anyhow::anyhow!("not connected")),
        }
    }

    fn stats(&self) -> Option<Stats> {
        match self.stats.lock() {
            Ok(guard) => Some(guard.clone()),
            Err(_) => {
                tracing::error!("failed to get stats");
                None
            }
        }
    }
}

pub async fn connect_with_config(capacity: usize, config: config::Config) -> Result<Client> {
    let mut client = Client::new(capacity, config);
    client.connect().await?;
    Ok(client)
}
