pub mod client;
pub mod server;

use client::*;
use server::*;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate(SessionUpdateEvent),
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend(InputAudioBufferAppendEvent),
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate(ConversationItemCreateEvent),
    #[serde(rename = "response.create")]
    ResponseCreate(ResponseCreateEvent),
}

/// Events the server pushes over the websocket. Event types this crate does
/// not model deserialize to [`ServerEvent::Unknown`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Synthesized locally when the websocket closes.
    #[serde(rename = "close")]
    Close { reason: Option<String> },
    #[serde(rename = "error")]
    Error(ErrorEvent),
    #[serde(rename = "session.created")]
    SessionCreated(SessionEvent),
    #[serde(rename = "session.updated")]
    SessionUpdated(SessionEvent),
    #[serde(rename = "input_audio_buffer.speech_started")]
    InputAudioBufferSpeechStarted(SpeechStartedEvent),
    #[serde(rename = "input_audio_buffer.speech_stopped")]
    InputAudioBufferSpeechStopped(SpeechStoppedEvent),
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    InputAudioTranscriptionCompleted(TranscriptionCompletedEvent),
    #[serde(rename = "conversation.item.input_audio_transcription.failed")]
    InputAudioTranscriptionFailed(TranscriptionFailedEvent),
    #[serde(rename = "response.created")]
    ResponseCreated(ResponseEvent),
    #[serde(rename = "response.done")]
    ResponseDone(ResponseEvent),
    #[serde(rename = "response.output_item.done")]
    ResponseOutputItemDone(OutputItemDoneEvent),
    #[serde(rename = "response.text.done")]
    ResponseTextDone(TextDoneEvent),
    #[serde(rename = "response.audio_transcript.done")]
    ResponseAudioTranscriptDone(AudioTranscriptDoneEvent),
    #[serde(rename = "response.audio.delta")]
    ResponseAudioDelta(AudioDeltaEvent),
    #[serde(rename = "response.audio.done")]
    ResponseAudioDone(AudioDoneEvent),
    #[serde(rename = "response.function_call_arguments.done")]
    ResponseFunctionCallArgumentsDone(FunctionCallArgumentsDoneEvent),
    #[serde(other)]
    Unknown,
}
