mod error;
mod resources;

pub use error::ErrorDetails;
pub use resources::{ItemResource, ResponseResource, SessionResource, Usage};

/// `error`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorEvent {
    event_id: String,
    error: ErrorDetails,
}

impl ErrorEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn error(&self) -> &ErrorDetails {
        &self.error
    }
}

/// `session.created` and `session.updated`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionEvent {
    event_id: String,
    session: SessionResource,
}

impl SessionEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn session(&self) -> &SessionResource {
        &self.session
    }
}

/// `input_audio_buffer.speech_started`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SpeechStartedEvent {
    event_id: String,
    /// Milliseconds since the session started.
    audio_start_ms: u64,
    item_id: String,
}

impl SpeechStartedEvent {
    pub fn audio_start_ms(&self) -> u64 {
        self.audio_start_ms
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `input_audio_buffer.speech_stopped`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SpeechStoppedEvent {
    event_id: String,
    audio_end_ms: u64,
    item_id: String,
}

impl SpeechStoppedEvent {
    pub fn audio_end_ms(&self) -> u64 {
        self.audio_end_ms
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `conversation.item.input_audio_transcription.completed`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TranscriptionCompletedEvent {
    event_id: String,
    item_id: String,
    content_index: u32,
    transcript: String,
}

impl TranscriptionCompletedEvent {
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

/// `conversation.item.input_audio_transcription.failed`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TranscriptionFailedEvent {
    event_id: String,
    item_id: String,
    content_index: u32,
    error: ErrorDetails,
}

impl TranscriptionFailedEvent {
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn error(&self) -> &ErrorDetails {
        &self.error
    }
}

/// `response.created` and `response.done`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseEvent {
    event_id: String,
    response: ResponseResource,
}

impl ResponseEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response(&self) -> &ResponseResource {
        &self.response
    }
}

/// `response.output_item.done`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OutputItemDoneEvent {
    event_id: String,
    response_id: String,
    output_index: u32,
    item: ItemResource,
}

impl OutputItemDoneEvent {
    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item(&self) -> &ItemResource {
        &self.item
    }
}

/// `response.text.done`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TextDoneEvent {
    event_id: String,
    response_id: String,
    item_id: String,
    output_index: u32,
    content_index: u32,
    text: String,
}

impl TextDoneEvent {
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// `response.audio_transcript.done`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AudioTranscriptDoneEvent {
    event_id: String,
    response_id: String,
    item_id: String,
    output_index: u32,
    content_index: u32,
    transcript: String,
}

impl AudioTranscriptDoneEvent {
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

/// `response.audio.delta`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AudioDeltaEvent {
    event_id: String,
    response_id: String,
    item_id: String,
    output_index: u32,
    content_index: u32,
    /// Base64 PCM16 chunk.
    delta: String,
}

impl AudioDeltaEvent {
    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn delta(&self) -> &str {
        &self.delta
    }
}

/// `response.audio.done`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AudioDoneEvent {
    event_id: String,
    response_id: String,
    item_id: String,
}

impl AudioDoneEvent {
    pub fn response_id(&self) -> &str {
        &self.response_id
    }
}

/// `response.function_call_arguments.done`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionCallArgumentsDoneEvent {
    event_id: String,
    response_id: String,
    item_id: String,
    output_index: u32,
    call_id: String,
    /// Only sent by newer API revisions.
    #[serde(default)]
    name: Option<String>,
    arguments: String,
}

impl FunctionCallArgumentsDoneEvent {
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}
