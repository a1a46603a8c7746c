use std::path::PathBuf;

/// Why a callable function could not produce its normal result.
///
/// The session never aborts on these; [`FunctionError::to_payload`] is sent
/// back to the model as the function output instead.
#[derive(Debug, thiserror::Error)]
pub enum FunctionError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("invalid arguments for {function}: {message}")]
    InvalidArguments { function: String, message: String },
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl FunctionError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownFunction(_) => "unknown_function",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::Validation { .. } => "validation_failed",
            Self::Internal(_) => "internal_error",
        }
    }

    /// `{"success": false, "error": {"code": ..., "message": ...}}`
    pub fn to_payload(&self) -> String {
        serde_json::json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        })
        .to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("room metadata is not a JSON object: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("amountOwed is not a number: {0}")]
    InvalidAmount(String),
    #[error("paymentDueDate is not a YYYY-MM-DD date: {0}")]
    InvalidDueDate(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("failed to read prompts from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no prompt named {0}")]
    Missing(String),
}
