mod consts;
mod transcription;
mod turn_detection;

pub use consts::*;
pub use transcription::InputAudioTranscription;
pub use turn_detection::{ServerVadTurnDetection, TurnDetection};

/// Base64 of little-endian PCM16 mono audio.
pub type Base64EncodedAudioBytes = String;
