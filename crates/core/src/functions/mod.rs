//! Registries of functions the model may call during a conversation.

use async_trait::async_trait;
use openai_realtime_types::tools::Tool;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FunctionError;

pub mod assistant;
pub mod collections;
pub mod outbound;

pub use assistant::AssistantFunctions;
pub use collections::CollectionsFunctions;
pub use outbound::OutboundFunctions;

#[async_trait]
pub trait FunctionContext: Send {
    /// Declarations sent to the model with `session.update`.
    fn tools(&self) -> Vec<Tool>;

    /// Runs `name` with the model supplied JSON `arguments`.
    async fn call(&mut self, name: &str, arguments: &str) -> Result<String, FunctionError>;

    /// Runs once the caller has left.
    fn call_ended(&mut self) -> Option<String> {
        None
    }
}

/// JSON schema for a tool's parameter struct, with field doc comments as
/// descriptions and optional fields left out of `required`.
pub(crate) fn parameters<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|s| {
            s.inline_subschemas = true;
            s.option_add_null_type = false;
        })
        .into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
        object.remove("description");
        object
            .entry("properties")
            .or_insert_with(|| Value::Object(Default::default()));
    }
    value
}

pub(crate) fn tool<T: JsonSchema>(name: &str, description: &str) -> Tool {
    Tool::function(name, description, parameters::<T>())
}

pub(crate) fn parse_args<T: DeserializeOwned>(
    function: &str,
    arguments: &str,
) -> Result<T, FunctionError> {
    let arguments = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(arguments).map_err(|e| FunctionError::InvalidArguments {
        function: function.to_string(),
        message: e.to_string(),
    })
}

/// Money amounts must be finite and non-negative.
pub(crate) fn amount(field: &'static str, value: f64) -> Result<f64, FunctionError> {
    if !value.is_finite() {
        return Err(FunctionError::validation(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(FunctionError::validation(field, "must not be negative"));
    }
    Ok(value)
}

/// Parameterless functions.
#[derive(Debug, serde::Deserialize, JsonSchema)]
pub(crate) struct NoArgs {}
