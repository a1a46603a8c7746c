use async_trait::async_trait;
use openai_realtime_types::tools::Tool;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{FunctionContext, parse_args, tool};
use crate::error::FunctionError;

#[derive(Debug, Deserialize, JsonSchema)]
struct WeatherArgs {
    /// The location to get weather for
    location: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AppointmentArgs {
    /// The date for the appointment
    date: String,
    /// The time for the appointment
    time: String,
    /// Description of the appointment
    description: String,
}

/// General assistant functions. Both answers are canned.
#[derive(Debug, Default)]
pub struct AssistantFunctions;

impl AssistantFunctions {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FunctionContext for AssistantFunctions {
    fn tools(&self) -> Vec<Tool> {
        vec![
            tool::<WeatherArgs>("get_weather", "Get the current weather for a location"),
            tool::<AppointmentArgs>("schedule_appointment", "Schedule an appointment"),
        ]
    }

    async fn call(&mut self, name: &str, arguments: &str) -> Result<String, FunctionError> {
        match name {
            "get_weather" => {
                let args: WeatherArgs = parse_args(name, arguments)?;
                Ok(format!("The weather in {} is sunny and 72°F", args.location))
            }
            "schedule_appointment" => {
                let args: AppointmentArgs = parse_args(name, arguments)?;
                Ok(format!(
                    "Appointment scheduled for {} at {}: {}",
                    args.date, args.time, args.description
                ))
            }
            other => Err(FunctionError::UnknownFunction(other.to_string())),
        }
    }
}
