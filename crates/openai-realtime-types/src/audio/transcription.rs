use crate::audio::TranscriptionModel;

/// Transcription of the caller's audio, run alongside the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioTranscription {
    model: TranscriptionModel,
    /// ISO-639-1 code, e.g. "en".
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl Default for InputAudioTranscription {
    fn default() -> Self {
        Self {
            model: TranscriptionModel::Whisper,
            language: None,
        }
    }
}

impl InputAudioTranscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: TranscriptionModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn model(&self) -> &TranscriptionModel {
        &self.model
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}
