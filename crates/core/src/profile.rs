use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use openai_realtime_types::Session;
use openai_realtime_types::audio::{
    AudioFormat, InputAudioTranscription, ServerVadTurnDetection, TranscriptionModel,
    TurnDetection, Voice,
};
use openai_realtime_types::tools::Tool;

use crate::customer::CustomerInfo;
use crate::error::PromptError;
use crate::prompts::Prompts;

/// Lowest temperature the realtime API accepts.
pub const MIN_REALTIME_TEMPERATURE: f32 = 0.6;
pub const DEFAULT_REALTIME_MODEL: &str = "gpt-4o-mini-realtime-preview";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Assistant,
    Collections,
    Outbound,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [Self::Assistant, Self::Collections, Self::Outbound];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assistant => "assistant",
            Self::Collections => "collections",
            Self::Outbound => "outbound",
        }
    }

    /// Who the remote participant is, for log lines.
    pub fn caller_label(&self) -> &'static str {
        match self {
            Self::Assistant => "User",
            Self::Collections | Self::Outbound => "Customer",
        }
    }

    pub fn agent_label(&self) -> &'static str {
        match self {
            Self::Assistant => "Assistant",
            Self::Collections | Self::Outbound => "Agent",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "assistant" => Ok(Self::Assistant),
            "collections" | "inbound" => Ok(Self::Collections),
            "outbound" => Ok(Self::Outbound),
            other => Err(format!(
                "unknown agent kind '{other}', expected assistant, collections or outbound"
            )),
        }
    }
}

/// Voice pipeline settings for one agent kind.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceProfile {
    pub model: String,
    pub transcription: TranscriptionModel,
    pub language: String,
    pub temperature: f32,
    pub voice: Voice,
    pub speed: f32,
    /// Server VAD threshold; higher needs louder speech to interrupt the agent.
    pub vad_threshold: f32,
}

impl VoiceProfile {
    pub fn for_kind(kind: AgentKind) -> Self {
        let (temperature, voice, speed) = match kind {
            AgentKind::Assistant => (0.7, Voice::Alloy, 1.0),
            AgentKind::Collections => (0.3, Voice::Coral, 0.95),
            AgentKind::Outbound => (0.5, Voice::Coral, 1.0),
        };
        Self {
            model: DEFAULT_REALTIME_MODEL.to_string(),
            transcription: TranscriptionModel::Whisper,
            language: "en".to_string(),
            temperature,
            voice,
            speed,
            vad_threshold: 0.6,
        }
    }

    /// The temperature sent to the model, raised to the API minimum.
    pub fn effective_temperature(&self) -> f32 {
        self.temperature.max(MIN_REALTIME_TEMPERATURE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub kind: AgentKind,
    pub instructions: String,
    pub greeting: String,
    pub voice: VoiceProfile,
}

impl AgentProfile {
    /// Outbound templates are filled from `customer`; other kinds ignore it.
    pub fn build(
        kind: AgentKind,
        prompts: &Prompts,
        customer: Option<&CustomerInfo>,
        today: NaiveDate,
    ) -> Result<Self, PromptError> {
        let vars = match (kind, customer) {
            (AgentKind::Outbound, Some(customer)) => vec![
                ("customer_name", customer.customer_name.clone()),
                ("amount_owed", format!("{:.2}", customer.amount_owed)),
                ("payment_due_date", customer.due_date_string()),
                ("days_until_due", customer.days_until_due(today).to_string()),
            ],
            _ => Vec::new(),
        };
        Ok(Self {
            kind,
            instructions: prompts.render(&format!("{kind}_instructions"), &vars)?,
            greeting: prompts.render(&format!("{kind}_greeting"), &vars)?,
            voice: VoiceProfile::for_kind(kind),
        })
    }

    pub fn to_session(&self, tools: Vec<Tool>) -> Session {
        let voice = &self.voice;
        if voice.temperature < MIN_REALTIME_TEMPERATURE {
            tracing::debug!(
                "{} temperature {} raised to {}",
                self.kind,
                voice.temperature,
                MIN_REALTIME_TEMPERATURE
            );
        }
        Session::new()
            .with_modalities_enable_audio()
            .with_instructions(&self.instructions)
            .with_voice(voice.voice.clone())
            .with_audio_format(AudioFormat::Pcm16)
            .with_input_audio_transcription(
                InputAudioTranscription::new()
                    .with_model(voice.transcription.clone())
                    .with_language(&voice.language),
            )
            .with_turn_detection_enable(TurnDetection::ServerVad(
                ServerVadTurnDetection::default()
                    .with_threshold(voice.vad_threshold)
                    .with_create_response(true)
                    .with_interrupt_response(true),
            ))
            .with_tools(tools)
            .with_temperature(voice.effective_temperature())
            .with_speed(voice.speed)
            .build()
    }
}
