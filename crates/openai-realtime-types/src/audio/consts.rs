use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Voice {
    Alloy,
    Ash,
    Ballad,
    Coral,
    Echo,
    Sage,
    Shimmer,
    Verse,
    Custom(String),
}

impl Voice {
    pub fn as_str(&self) -> &str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Ash => "ash",
            Voice::Ballad => "ballad",
            Voice::Coral => "coral",
            Voice::Echo => "echo",
            Voice::Sage => "sage",
            Voice::Shimmer => "shimmer",
            Voice::Verse => "verse",
            Voice::Custom(s) => s,
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "alloy" => Voice::Alloy,
            "ash" => Voice::Ash,
            "ballad" => Voice::Ballad,
            "coral" => Voice::Coral,
            "echo" => Voice::Echo,
            "sage" => Voice::Sage,
            "shimmer" => Voice::Shimmer,
            "verse" => Voice::Verse,
            other => Voice::Custom(other.to_string()),
        })
    }
}

impl Serialize for Voice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Voice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let Ok(voice) = Voice::from_str(&s);
        Ok(voice)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub enum AudioFormat {
    #[serde(rename = "pcm16")]
    Pcm16,
    #[serde(rename = "g711_ulaw")]
    Mulaw,
    #[serde(rename = "g711_alaw")]
    Alaw,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionModel {
    Whisper,
    Gpt4oTranscribe,
    Custom(String),
}

impl TranscriptionModel {
    pub fn as_str(&self) -> &str {
        match self {
            TranscriptionModel::Whisper => "whisper-1",
            TranscriptionModel::Gpt4oTranscribe => "gpt-4o-transcribe",
            TranscriptionModel::Custom(s) => s,
        }
    }
}

impl Serialize for TranscriptionModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TranscriptionModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "whisper-1" => TranscriptionModel::Whisper,
            "gpt-4o-transcribe" => TranscriptionModel::Gpt4oTranscribe,
            _ => TranscriptionModel::Custom(s),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct AudioConsts {
        #[serde(skip_serializing_if = "Option::is_none")]
        voice: Option<Voice>,
        #[serde(skip_serializing_if = "Option::is_none")]
        audio_format: Option<AudioFormat>,
    }

    #[test]
    fn test_serialize() {
        let consts = AudioConsts {
            voice: Some(Voice::Coral),
            audio_format: Some(AudioFormat::Pcm16),
        };
        let json = serde_json::to_string(&consts).unwrap();
        assert_eq!(json, r#"{"voice":"coral","audio_format":"pcm16"}"#);

        let consts = AudioConsts {
            voice: Some(Voice::Custom("marin".to_string())),
            audio_format: None,
        };
        let json = serde_json::to_string(&consts).unwrap();
        assert_eq!(json, r#"{"voice":"marin"}"#);
    }

    #[test]
    fn test_deserialize() {
        let consts: AudioConsts =
            serde_json::from_str(r#"{"voice":"sage","audio_format":"g711_ulaw"}"#).unwrap();
        assert_eq!(consts.voice, Some(Voice::Sage));
        assert_eq!(consts.audio_format, Some(AudioFormat::Mulaw));

        let consts: AudioConsts = serde_json::from_str(r#"{"voice":"cedar"}"#).unwrap();
        assert_eq!(consts.voice, Some(Voice::Custom("cedar".to_string())));
    }

    #[test]
    fn voice_from_str_round_trips_known_names() {
        for name in ["alloy", "ash", "ballad", "coral", "echo", "sage", "shimmer", "verse"] {
            let voice: Voice = name.parse().unwrap();
            assert_eq!(voice.to_string(), name);
        }
    }
}
