use crate::Item;
use crate::audio::Base64EncodedAudioBytes;
use crate::session::{ResponseConfig, Session};

/// `session.update`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionUpdateEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,
    session: Session,
}

impl SessionUpdateEvent {
    pub fn new(session: Session) -> Self {
        Self {
            event_id: None,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// `input_audio_buffer.append`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferAppendEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,
    audio: Base64EncodedAudioBytes,
}

impl InputAudioBufferAppendEvent {
    pub fn new(audio: Base64EncodedAudioBytes) -> Self {
        Self {
            event_id: None,
            audio,
        }
    }

    pub fn audio(&self) -> &str {
        &self.audio
    }
}

/// `conversation.item.create`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConversationItemCreateEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,
    /// Insert after this item; appended to the end when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_item_id: Option<String>,
    item: Item,
}

impl ConversationItemCreateEvent {
    pub fn new(item: Item) -> Self {
        Self {
            event_id: None,
            previous_item_id: None,
            item,
        }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }
}

/// `response.create`
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ResponseCreateEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<ResponseConfig>,
}

impl ResponseCreateEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ResponseConfig) -> Self {
        self.response = Some(config);
        self
    }

    pub fn config(&self) -> Option<&ResponseConfig> {
        self.response.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use crate::events::ClientEvent;
    use crate::{FunctionCallOutputItem, Item, ResponseConfig};

    use super::*;

    #[test]
    fn client_events_are_tagged() {
        let event = ClientEvent::ConversationItemCreate(ConversationItemCreateEvent::new(
            Item::FunctionCallOutput(FunctionCallOutputItem::new("call_9", "done")),
        ));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "conversation.item.create");
        assert_eq!(json["item"]["type"], "function_call_output");
        assert!(json.get("event_id").is_none());

        let event = ClientEvent::ResponseCreate(
            ResponseCreateEvent::new().with_config(ResponseConfig::verbatim("Hi")),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "response.create");
        assert!(json["response"]["instructions"].as_str().unwrap().contains("Hi"));

        let json = serde_json::to_value(ClientEvent::InputAudioBufferAppend(
            InputAudioBufferAppendEvent::new("AAAA".to_string()),
        ))
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "input_audio_buffer.append", "audio": "AAAA"}));
    }
}
