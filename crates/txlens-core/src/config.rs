use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Nesting levels the bytes expander descends into.
    pub max_depth: usize,
    pub source_timeout_ms: u64,
    /// Ceiling for one whole decode, all strategies included.
    pub decode_timeout_ms: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            source_timeout_ms: 10_000,
            decode_timeout_ms: 20_000,
        }
    }
}

impl DecoderConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }
}
