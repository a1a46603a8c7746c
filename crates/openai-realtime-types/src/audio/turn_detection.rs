#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    #[serde(rename = "server_vad")]
    ServerVad(ServerVadTurnDetection),
}

impl Default for TurnDetection {
    fn default() -> Self {
        Self::ServerVad(ServerVadTurnDetection::default())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServerVadTurnDetection {
    /// Activation threshold (0.0 to 1.0). Higher values need louder speech,
    /// which also makes the agent harder to interrupt.
    threshold: f32,

    /// Audio kept before detected speech, in milliseconds.
    prefix_padding_ms: u32,

    /// Silence that ends a turn, in milliseconds.
    silence_duration_ms: u32,

    /// Start a response automatically when the caller stops speaking.
    create_response: bool,

    /// Cancel the in-flight response when the caller starts speaking.
    interrupt_response: bool,
}

impl Default for ServerVadTurnDetection {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            prefix_padding_ms: 300,
            silence_duration_ms: 500,
            create_response: true,
            interrupt_response: true,
        }
    }
}

impl ServerVadTurnDetection {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_prefix_padding_ms(mut self, prefix_padding_ms: u32) -> Self {
        self.prefix_padding_ms = prefix_padding_ms;
        self
    }

    pub fn with_silence_duration_ms(mut self, silence_duration_ms: u32) -> Self {
        self.silence_duration_ms = silence_duration_ms;
        self
    }

    pub fn with_create_response(mut self, create_response: bool) -> Self {
        self.create_response = create_response;
        self
    }

    pub fn with_interrupt_response(mut self, interrupt_response: bool) -> Self {
        self.interrupt_response = interrupt_response;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn silence_duration_ms(&self) -> u32 {
        self.silence_duration_ms
    }

    pub fn interrupt_response(&self) -> bool {
        self.interrupt_response
    }
}
