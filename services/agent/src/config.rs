//! Application configuration, loaded once at startup from the environment
//! (and a `.env` file when present).

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use collections_core::profile::DEFAULT_REALTIME_MODEL;
use secrecy::{ExposeSecret, SecretString};
use tracing::Level;

// --- Application Constants ---

/// Frames per microphone callback in console mode.
pub const INPUT_CHUNK_SIZE: usize = 1024;
/// Frames per speaker callback in console mode.
pub const OUTPUT_CHUNK_SIZE: usize = 1024;
/// Playback buffer length in console mode.
pub const OUTPUT_LATENCY_MS: usize = 1000;
/// Bounded channel size between a transport and its session.
pub const CALL_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Public websocket base handed out with room tokens.
    pub voice_service_url: String,
    pub voice_api_key: Option<String>,
    pub voice_api_secret: Option<SecretString>,
    pub openai_api_key: Option<SecretString>,
    pub realtime_model: String,
    pub prompts_dir: Option<PathBuf>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// *   `BIND_ADDRESS`: (Optional) Listen address for `serve`. Defaults to "0.0.0.0:3000".
    /// *   `VOICE_SERVICE_URL`: (Optional) URL returned with tokens. Defaults to
    ///     `ws://<BIND_ADDRESS>`.
    /// *   `VOICE_API_KEY` / `VOICE_API_SECRET`: Token issuer and HS256 signing secret.
    /// *   `OPENAI_API_KEY`: Required to run an agent.
    /// *   `OPENAI_REALTIME_MODEL`: (Optional) Realtime model name.
    /// *   `PROMPTS_DIR`: (Optional) Directory of `*.md` prompt overrides.
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Ignored if there is no .env file.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let voice_service_url = var("VOICE_SERVICE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("ws://{bind_address}"));

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            voice_service_url,
            voice_api_key: var("VOICE_API_KEY"),
            voice_api_secret: var("VOICE_API_SECRET").map(SecretString::from),
            openai_api_key: var("OPENAI_API_KEY").map(SecretString::from),
            realtime_model: var("OPENAI_REALTIME_MODEL")
                .unwrap_or_else(|| DEFAULT_REALTIME_MODEL.to_string()),
            prompts_dir: var("PROMPTS_DIR").map(PathBuf::from),
            log_level,
        })
    }

    /// Connection settings for the realtime API; fails without an API key.
    pub fn realtime(&self) -> Result<openai_realtime::Config, ConfigError> {
        let api_key = self
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        Ok(openai_realtime::Config::builder()
            .with_api_key(api_key.expose_secret())
            .with_model(&self.realtime_model)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.voice_service_url, "ws://0.0.0.0:3000");
        assert_eq!(config.realtime_model, DEFAULT_REALTIME_MODEL);
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.prompts_dir.is_none());
        assert!(matches!(config.realtime(), Err(ConfigError::MissingVar(_))));
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("VOICE_SERVICE_URL", "wss://voice.example.com/"),
            ("VOICE_API_KEY", "APIkey"),
            ("VOICE_API_SECRET", "s3cret"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_REALTIME_MODEL", "gpt-4o-realtime-preview"),
            ("PROMPTS_DIR", "./prompts"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.voice_service_url, "wss://voice.example.com");
        assert_eq!(config.voice_api_key.as_deref(), Some("APIkey"));
        assert_eq!(config.voice_api_secret.as_ref().map(|s| s.expose_secret()), Some("s3cret"));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.prompts_dir, Some(PathBuf::from("./prompts")));
        let realtime = config.realtime().unwrap();
        assert_eq!(realtime.model(), "gpt-4o-realtime-preview");
        assert_eq!(realtime.api_key().expose_secret(), "sk-test");
    }

    #[test]
    fn rejects_bad_values() {
        let err = Config::from_lookup(lookup(&[("BIND_ADDRESS", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "BIND_ADDRESS"));
        let err = Config::from_lookup(lookup(&[("RUST_LOG", "chatty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "RUST_LOG"));
    }
}
