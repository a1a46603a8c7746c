use crate::content::message::MessageItem;

/// A conversation item created by the client.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    #[serde(rename = "message")]
    Message(MessageItem),
    #[serde(rename = "function_call")]
    FunctionCall(FunctionCallItem),
    #[serde(rename = "function_call_output")]
    FunctionCallOutput(FunctionCallOutputItem),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ItemStatus {
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "incomplete")]
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionCallItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    call_id: String,
    name: String,
    /// JSON encoded arguments, exactly as produced by the model.
    arguments: String,
}

impl FunctionCallItem {
    pub fn new(call_id: &str, name: &str, arguments: &str) -> Self {
        Self {
            id: None,
            call_id: call_id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}

/// The result of a function call, fed back into the model's context.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionCallOutputItem {
    call_id: String,
    output: String,
}

impl FunctionCallOutputItem {
    pub fn new(call_id: &str, output: &str) -> Self {
        Self {
            call_id: call_id.to_string(),
            output: output.to_string(),
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_call_output_carries_call_id() {
        let output = FunctionCallOutputItem::new("call_1", r#"{"ok":true}"#);
        let item = Item::FunctionCallOutput(output);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "function_call_output");
        assert_eq!(json["call_id"], "call_1");
        assert_eq!(json["output"], r#"{"ok":true}"#);
    }
}
