pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_REALTIME_MODEL: &str = "OPENAI_REALTIME_MODEL";

pub const BASE_URL: &str = "wss://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini-realtime-preview";

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const OPENAI_BETA_HEADER: &str = "OpenAI-Beta";
