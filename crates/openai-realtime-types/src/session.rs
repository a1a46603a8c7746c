use crate::audio::{AudioFormat, InputAudioTranscription, TurnDetection, Voice};
use crate::tools::{Tool, ToolChoice};

/// Session configuration sent with `session.update`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    /// ["text"] disables audio output, ["text", "audio"] enables it.
    modalities: Vec<String>,

    /// System instructions prepended to every model call.
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,

    /// Cannot be changed once the model has answered with audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<Voice>,

    #[serde(skip_serializing_if = "Option::is_none")]
    input_audio_format: Option<AudioFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    output_audio_format: Option<AudioFormat>,

    /// `null` turns transcription of caller audio off.
    input_audio_transcription: Option<InputAudioTranscription>,

    /// `null` turns server side turn detection off.
    turn_detection: Option<TurnDetection>,

    #[serde(default)]
    tools: Vec<Tool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,

    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Playback speed of synthesized speech, 1.0 is normal.
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,

    /// "inf" or a number.
    #[serde(skip_serializing_if = "Option::is_none")]
    max_response_output_tokens: Option<MaxOutputTokens>,
}

impl Session {
    pub fn new() -> SessionConfigurator {
        SessionConfigurator::new()
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub fn speed(&self) -> Option<f32> {
        self.speed
    }

    pub fn turn_detection(&self) -> Option<&TurnDetection> {
        self.turn_detection.as_ref()
    }

    pub fn input_audio_transcription(&self) -> Option<&InputAudioTranscription> {
        self.input_audio_transcription.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MaxOutputTokens {
    Number(i32),
    Infinity(String),
}

pub struct SessionConfigurator {
    session: Session,
}

impl Default for SessionConfigurator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfigurator {
    pub fn new() -> Self {
        Self {
            session: Session {
                modalities: vec!["text".to_string(), "audio".to_string()],
                instructions: None,
                voice: None,
                input_audio_format: None,
                output_audio_format: None,
                input_audio_transcription: None,
                turn_detection: None,
                tools: vec![],
                tool_choice: None,
                temperature: None,
                speed: None,
                max_response_output_tokens: None,
            },
        }
    }

    pub fn with_modalities_disable_audio(mut self) -> Self {
        self.session.modalities = vec!["text".to_string()];
        self
    }

    pub fn with_modalities_enable_audio(mut self) -> Self {
        self.session.modalities = vec!["text".to_string(), "audio".to_string()];
        self
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.session.instructions = Some(instructions.to_string());
        self
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.session.voice = Some(voice);
        self
    }

    pub fn with_audio_format(mut self, format: AudioFormat) -> Self {
        self.session.input_audio_format = Some(format.clone());
        self.session.output_audio_format = Some(format);
        self
    }

    pub fn with_input_audio_transcription(
        mut self,
        transcription: InputAudioTranscription,
    ) -> Self {
        self.session.input_audio_transcription = Some(transcription);
        self
    }

    pub fn with_turn_detection_enable(mut self, turn_detection: TurnDetection) -> Self {
        self.session.turn_detection = Some(turn_detection);
        self
    }

    pub fn with_turn_detection_disable(mut self) -> Self {
        self.session.turn_detection = None;
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        if !tools.is_empty() && self.session.tool_choice.is_none() {
            self.session.tool_choice = Some(ToolChoice::Auto);
        }
        self.session.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.session.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.session.temperature = Some(temperature);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.session.speed = Some(speed);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: MaxOutputTokens) -> Self {
        self.session.max_response_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn build(self) -> Session {
        self.session
    }
}

/// Per-response overrides sent with `response.create`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    modalities: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
}

impl ResponseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the model to speak `text` verbatim. Used for greetings.
    pub fn verbatim(text: &str) -> Self {
        Self::new().with_instructions(&format!(
            "Say exactly the following to the caller, without adding anything: {text}"
        ))
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.instructions = Some(instructions.to_string());
        self
    }

    pub fn with_audio(mut self) -> Self {
        self.modalities = Some(vec!["text".to_string(), "audio".to_string()]);
        self
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ServerVadTurnDetection, TranscriptionModel};

    #[test]
    fn builder_skips_unset_fields() {
        let session = Session::new().with_instructions("be brief").build();
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["instructions"], "be brief");
        assert!(json.get("voice").is_none());
        assert!(json.get("temperature").is_none());
        assert!(json["turn_detection"].is_null());
        assert!(json["input_audio_transcription"].is_null());
    }

    #[test]
    fn tools_default_tool_choice_to_auto() {
        let tool = Tool::function("f", "d", serde_json::json!({"type": "object"}));
        let session = Session::new().with_tools(vec![tool]).build();
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["tool_choice"], "auto");
        assert_eq!(json["tools"][0]["name"], "f");
    }

    #[test]
    fn full_voice_session() {
        let session = Session::new()
            .with_voice(Voice::Coral)
            .with_temperature(0.6)
            .with_speed(0.95)
            .with_audio_format(AudioFormat::Pcm16)
            .with_input_audio_transcription(
                InputAudioTranscription::new()
                    .with_model(TranscriptionModel::Whisper)
                    .with_language("en"),
            )
            .with_turn_detection_enable(TurnDetection::ServerVad(
                ServerVadTurnDetection::default().with_threshold(0.6),
            ))
            .build();
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["voice"], "coral");
        assert_eq!(json["input_audio_format"], "pcm16");
        assert_eq!(json["output_audio_format"], "pcm16");
        assert_eq!(json["input_audio_transcription"]["language"], "en");
        assert_eq!(json["turn_detection"]["type"], "server_vad");
        assert!((json["speed"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert_eq!(session.voice(), Some(&Voice::Coral));
    }

    #[test]
    fn verbatim_response_wraps_text() {
        let config = ResponseConfig::verbatim("Hello there.");
        assert!(config.instructions().unwrap().ends_with("Hello there."));
    }
}
