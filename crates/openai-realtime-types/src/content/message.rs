use crate::content::items::ItemStatus;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MessageItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<ItemStatus>,

    role: MessageRole,

    content: Vec<Content>,
}

impl MessageItem {
    pub fn builder() -> MessageItemBuilder {
        MessageItemBuilder::new()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn role(&self) -> &MessageRole {
        &self.role
    }

    pub fn content(&self) -> &[Content] {
        &self.content
    }
}

pub struct MessageItemBuilder {
    item: MessageItem,
}

impl Default for MessageItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageItemBuilder {
    pub fn new() -> Self {
        Self {
            item: MessageItem {
                id: None,
                status: None,
                role: MessageRole::User,
                content: Vec::new(),
            },
        }
    }

    pub fn with_role(mut self, role: MessageRole) -> Self {
        self.item.role = role;
        self
    }

    pub fn with_input_text(mut self, text: &str) -> Self {
        self.item.content.push(Content::InputText(TextContent::new(text)));
        self
    }

    pub fn build(self) -> MessageItem {
        self.item
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "input_text")]
    InputText(TextContent),
    #[serde(rename = "input_audio")]
    InputAudio(AudioContent),
    #[serde(rename = "text")]
    Text(TextContent),
    #[serde(rename = "audio")]
    Audio(AudioContent),
    #[serde(other)]
    Unsupported,
}

impl Content {
    /// The readable part of the content: text, or the transcript of audio.
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::InputText(c) | Content::Text(c) => Some(&c.text),
            Content::InputAudio(c) | Content::Audio(c) => c.transcript.as_deref(),
            Content::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct TextContent {
    text: String,
}

impl TextContent {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct AudioContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transcript: Option<String>,
}
