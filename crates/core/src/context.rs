use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Append-only transcript of one call, opened by the system prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationContext {
    messages: Vec<ChatMessage>,
}

impl ConversationContext {
    pub fn new(system_prompt: &str) -> Self {
        let mut context = Self::default();
        context.push(ChatRole::System, system_prompt);
        context
    }

    pub fn push(&mut self, role: ChatRole, content: &str) {
        self.messages.push(ChatMessage {
            role,
            content: content.to_string(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
    }

    /// Messages spoken by either side, excluding the system prompt.
    pub fn turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .count()
    }
}
