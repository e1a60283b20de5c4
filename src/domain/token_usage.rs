/// Usage counters reported by a provider for one call.
///
/// Missing counters in a provider response are recorded as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub images_generated: i32,
}

impl TokenUsage {
    pub fn tokens(input_tokens: i64, output_tokens: i64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            images_generated: 0,
        }
    }

    pub fn has_tokens(&self) -> bool {
        self.input_tokens > 0 || self.output_tokens > 0
    }
}
