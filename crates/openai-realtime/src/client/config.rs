use secrecy::SecretString;

use crate::client::consts::{BASE_URL, DEFAULT_MODEL, OPENAI_API_KEY, OPENAI_REALTIME_MODEL};

pub struct Config {
    base_url: String,
    api_key: SecretString,
    model: String,
}

pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.config.api_key = SecretString::from(api_key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.config.model = model.to_string();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Defaults, with the key and model taken from `OPENAI_API_KEY` and
    /// `OPENAI_REALTIME_MODEL` when set.
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key: std::env::var(OPENAI_API_KEY).unwrap_or_default().into(),
            model: std::env::var(OPENAI_REALTIME_MODEL)
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
