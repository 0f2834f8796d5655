//! Calculation options and configuration.

/// Options for Fibonacci calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Largest heap block any buffer may allocate, in bytes (0 = unlimited).
    pub memory_limit: usize,
    /// Largest index accepted (0 = unlimited).
    pub max_index: u64,
}

impl Options {
    /// Block budget to install for a calculation.
    #[must_use]
    pub fn block_limit(&self) -> Option<usize> {
        (self.memory_limit != 0).then_some(self.memory_limit)
    }

    /// Largest index accepted, if bounded.
    #[must_use]
    pub fn index_limit(&self) -> Option<u64> {
        (self.max_index != 0).then_some(self.max_index)
    }
}
