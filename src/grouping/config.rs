/// Tunable debounce thresholds for raw event grouping.
#[derive(Debug, Clone)]
pub struct GroupingConfig {
    /// Consecutive same-target input events this close together are one
    /// keystroke burst.
    pub input_debounce_ms: i64,

    /// Consecutive same-target clicks this close together are a double
    /// submit; only the last one survives.
    pub click_debounce_ms: i64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            input_debounce_ms: 500,
            click_debounce_ms: 200,
        }
    }
}
