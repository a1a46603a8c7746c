#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetails {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
    message: String,
    #[serde(default)]
    param: Option<String>,
    #[serde(default)]
    event_id: Option<String>,
}

impl ErrorDetails {
    pub fn error_type(&self) -> Option<&str> {
        self.error_type.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    /// The client event that caused the error, when the server names one.
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }
}
