use crate::content::message::{Content, MessageRole};
use crate::FunctionCallItem;

/// The session as the server sees it. Only the fields worth logging are
/// modelled.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionResource {
    id: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    voice: Option<String>,
}

impl SessionResource {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseResource {
    id: String,
    /// "in_progress", "completed", "cancelled", "failed" or "incomplete"
    status: String,
    #[serde(default)]
    output: Vec<ItemResource>,
    #[serde(default)]
    usage: Option<Usage>,
}

impl ResponseResource {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn output(&self) -> &[ItemResource] {
        &self.output
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }

    pub fn function_calls(&self) -> impl Iterator<Item = FunctionCallItem> + '_ {
        self.output.iter().filter_map(ItemResource::as_function_call)
    }
}

/// An item as echoed back by the server. The shape depends on `type`, so
/// every type specific field is optional.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ItemResource {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    role: Option<MessageRole>,
    #[serde(default)]
    content: Vec<Content>,
    #[serde(default)]
    call_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
    #[serde(default)]
    output: Option<String>,
}

impl ItemResource {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub fn role(&self) -> Option<&MessageRole> {
        self.role.as_ref()
    }

    pub fn content(&self) -> &[Content] {
        &self.content
    }

    pub fn as_function_call(&self) -> Option<FunctionCallItem> {
        if self.item_type != "function_call" {
            return None;
        }
        Some(FunctionCallItem::new(
            self.call_id.as_deref()?,
            self.name.as_deref()?,
            self.arguments.as_deref().unwrap_or("{}"),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct Usage {
    total_tokens: u32,
    input_tokens: u32,
    output_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }

    pub fn input_tokens(&self) -> u32 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u32 {
        self.output_tokens
    }
}
