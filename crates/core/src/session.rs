//! One call: pumps caller audio into the realtime connection, plays model
//! audio back, runs the model's function calls and publishes [`AgentEvent`]s.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use collections_native_utils::audio;
use openai_realtime::RealtimeClient;
use openai_realtime::types::events::server::ResponseEvent;
use openai_realtime::types::{FunctionCallOutputItem, Item, ResponseConfig, ServerEvent};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use crate::context::{ChatRole, ConversationContext};
use crate::events::{AgentEvent, CalledFunction, EventBus, ResponseMetrics, TokenUsage};
use crate::functions::FunctionContext;
use crate::profile::AgentProfile;

/// Audio and hang-up from the remote participant.
#[derive(Debug, Clone, PartialEq)]
pub enum CallerEvent {
    /// 24 kHz mono PCM16.
    Audio(Vec<i16>),
    Disconnected,
}

/// What the agent sends back to the participant.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentAudio {
    /// 24 kHz mono PCM16.
    Pcm(Vec<i16>),
    /// The caller barged in; drop whatever is still queued for playback.
    Interrupt,
}

/// The two channel ends a transport hands to a session.
pub struct CallIo {
    pub caller_rx: mpsc::Receiver<CallerEvent>,
    pub agent_tx: mpsc::Sender<AgentAudio>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Closed,
}

#[derive(Debug, Default)]
struct ResponseTimer {
    response_id: String,
    created: Option<Instant>,
    first_audio: Option<Instant>,
}

impl ResponseTimer {
    fn start(&mut self, response_id: &str, now: Instant) {
        self.response_id = response_id.to_string();
        self.created = Some(now);
        self.first_audio = None;
    }

    fn audio(&mut self, now: Instant) {
        if self.created.is_some() && self.first_audio.is_none() {
            self.first_audio = Some(now);
        }
    }

    fn finish(&mut self, event: &ResponseEvent, now: Instant) -> Option<ResponseMetrics> {
        let created = self.created.take()?;
        let response = event.response();
        Some(ResponseMetrics {
            response_id: response.id().to_string(),
            ttf: self.first_audio.take().map(|t| t.duration_since(created)),
            processing_time: now.duration_since(created),
            usage: response.usage().map(|u| TokenUsage {
                total: u.total_tokens(),
                input: u.input_tokens(),
                output: u.output_tokens(),
            }),
        })
    }
}

pub struct AgentSession<C: RealtimeClient> {
    client: C,
    profile: AgentProfile,
    functions: Box<dyn FunctionContext>,
    events: EventBus,
    context: ConversationContext,
    agent_tx: mpsc::Sender<AgentAudio>,
    timer: ResponseTimer,
    /// Agent audio has gone out since the last interrupt.
    agent_audible: bool,
}

impl<C: RealtimeClient> AgentSession<C> {
    pub fn new(
        client: C,
        profile: AgentProfile,
        functions: Box<dyn FunctionContext>,
        events: EventBus,
        agent_tx: mpsc::Sender<AgentAudio>,
    ) -> Self {
        let context = ConversationContext::new(&profile.instructions);
        Self {
            client,
            profile,
            functions,
            events,
            context,
            agent_tx,
            timer: ResponseTimer::default(),
            agent_audible: false,
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Configures the realtime session and speaks the greeting.
    pub async fn start(&mut self) -> Result<()> {
        let session = self.profile.to_session(self.functions.tools());
        tracing::debug!("Session config: {:?}", serde_json::to_string(&session)?);
        self.client
            .update_session(session)
            .await
            .context("Failed to configure realtime session")?;
        let greeting = self.profile.greeting.clone();
        self.say(&greeting).await
    }

    /// Speaks `text` verbatim; the caller can interrupt it like any response.
    pub async fn say(&mut self, text: &str) -> Result<()> {
        self.client
            .create_response_with(ResponseConfig::verbatim(text).with_audio())
            .await
            .context("Failed to request spoken response")
    }

    pub async fn push_caller_audio(&mut self, pcm: &[i16]) -> Result<()> {
        if pcm.is_empty() {
            return Ok(());
        }
        self.client
            .append_input_audio_buffer(audio::encode_i16(pcm))
            .await
            .context("Failed to send caller audio")
    }

    async fn handle_server_event(&mut self, event: ServerEvent) -> Result<Flow> {
        match event {
            ServerEvent::SessionCreated(data) => {
                tracing::info!("Session created: {:?}", data.session().id());
            }
            ServerEvent::SessionUpdated(_) => {
                tracing::debug!("Session updated");
            }
            ServerEvent::Error(e) => {
                tracing::error!("Realtime error: {}", e.error().message());
            }
            ServerEvent::InputAudioBufferSpeechStarted(_) => {
                if self.agent_audible {
                    self.agent_audible = false;
                    self.send_audio(AgentAudio::Interrupt).await;
                }
            }
            ServerEvent::InputAudioTranscriptionCompleted(data) => {
                let text = data.transcript().trim();
                if !text.is_empty() {
                    self.context.push(ChatRole::User, text);
                    self.events
                        .emit(&AgentEvent::UserSpeechCommitted(text.to_string()));
                }
            }
            ServerEvent::InputAudioTranscriptionFailed(data) => {
                tracing::warn!("Transcription failed: {}", data.error().message());
            }
            ServerEvent::ResponseCreated(data) => {
                self.timer.start(data.response().id(), Instant::now());
            }
            ServerEvent::ResponseAudioDelta(data) => {
                self.timer.audio(Instant::now());
                let pcm = audio::decode_i16(data.delta());
                if !pcm.is_empty() {
                    self.agent_audible = true;
                    self.send_audio(AgentAudio::Pcm(pcm)).await;
                }
            }
            ServerEvent::ResponseAudioTranscriptDone(data) => {
                let text = data.transcript().trim();
                if !text.is_empty() {
                    self.context.push(ChatRole::Assistant, text);
                    self.events
                        .emit(&AgentEvent::AgentSpeechCommitted(text.to_string()));
                }
            }
            ServerEvent::ResponseDone(data) => {
                if let Some(metrics) = self.timer.finish(&data, Instant::now()) {
                    self.events.emit(&AgentEvent::MetricsCollected(metrics));
                }
                self.run_function_calls(&data).await?;
            }
            ServerEvent::Close { reason } => {
                tracing::info!("Realtime connection closed: {:?}", reason);
                return Ok(Flow::Closed);
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    /// Runs every function call in a finished response, returns the outputs
    /// to the model and asks it to continue.
    async fn run_function_calls(&mut self, data: &ResponseEvent) -> Result<()> {
        let calls: Vec<_> = data.response().function_calls().collect();
        if calls.is_empty() {
            return Ok(());
        }

        let mut finished = Vec::with_capacity(calls.len());
        for call in calls {
            let (result, failed) = match self.functions.call(call.name(), call.arguments()).await {
                Ok(result) => (result, false),
                Err(e) => {
                    tracing::warn!("Function {} rejected: {}", call.name(), e);
                    (e.to_payload(), true)
                }
            };
            self.client
                .create_conversation_item(Item::FunctionCallOutput(FunctionCallOutputItem::new(
                    call.call_id(),
                    &result,
                )))
                .await
                .context("Failed to return function output")?;
            finished.push(CalledFunction {
                name: call.name().to_string(),
                arguments: call.arguments().to_string(),
                result,
                failed,
            });
        }

        self.events.emit(&AgentEvent::FunctionCallsFinished(finished));
        self.client
            .create_response()
            .await
            .context("Failed to resume after function calls")
    }

    async fn send_audio(&mut self, audio: AgentAudio) {
        if self.agent_tx.send(audio).await.is_err() {
            tracing::debug!("Participant audio channel closed");
        }
    }

    /// Drives the call until the participant leaves or the realtime
    /// connection closes. The end-of-call hooks run on every exit path.
    pub async fn run(
        mut self,
        participant: &str,
        mut caller_rx: mpsc::Receiver<CallerEvent>,
    ) -> Result<ConversationContext> {
        let started = Instant::now();
        let outcome = self.converse(&mut caller_rx).await;
        if let Err(e) = &outcome {
            tracing::error!("Call with {} failed: {:#}", participant, e);
        }
        self.finish(participant, started.elapsed());
        outcome.map(|()| self.context)
    }

    async fn converse(&mut self, caller_rx: &mut mpsc::Receiver<CallerEvent>) -> Result<()> {
        let mut server_rx = self
            .client
            .server_events()
            .await
            .context("Failed to get server events channel")?;
        self.start().await?;

        loop {
            tokio::select! {
                biased;
                event = server_rx.recv() => match event {
                    Ok(event) => {
                        if self.handle_server_event(event).await? == Flow::Closed {
                            return Ok(());
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!("Dropped {} realtime events", n);
                    }
                    Err(RecvError::Closed) => return Ok(()),
                },
                caller = caller_rx.recv() => match caller {
                    Some(CallerEvent::Audio(pcm)) => self.push_caller_audio(&pcm).await?,
                    Some(CallerEvent::Disconnected) | None => return Ok(()),
                },
            }
        }
    }

    fn finish(&mut self, participant: &str, duration: Duration) {
        self.events.emit(&AgentEvent::ParticipantDisconnected {
            identity: participant.to_string(),
            duration,
        });
        self.functions.call_ended();
        if let Some(stats) = self.client.stats() {
            tracing::info!(
                "Realtime usage - responses: {}, tokens: {} (input {}, output {})",
                stats.responses(),
                stats.total_tokens(),
                stats.input_tokens(),
                stats.output_tokens()
            );
        }
    }
}
