/// Token usage summed over every `response.done` of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    responses: u32,
    total_tokens: u64,
    input_tokens: u64,
    output_tokens: u64,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn update_usage(&mut self, total: u32, input: u32, output: u32) {
        self.responses += 1;
        self.total_tokens += u64::from(total);
        self.input_tokens += u64::from(input);
        self.output_tokens += u64::from(output);
    }

    pub fn responses(&self) -> u32 {
        self.responses
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn input_tokens(&self) -> u64 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u64 {
        self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_accumulates() {
        let mut stats = Stats::new();
        stats.update_usage(30, 20, 10);
        stats.update_usage(5, 4, 1);
        assert_eq!(stats.responses(), 2);
        assert_eq!(stats.total_tokens(), 35);
        assert_eq!(stats.input_tokens(), 24);
        assert_eq!(stats.output_tokens(), 11);
    }
}
