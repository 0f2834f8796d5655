//! Allocation failures surfaced by the buffer layer.

use std::collections::TryReserveError;

/// A heap block could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// The global allocator refused the request.
    #[error("failed to allocate a {requested}-byte block")]
    OutOfMemory {
        /// Size of the refused block in bytes.
        requested: usize,
        /// Error reported by the allocator.
        #[source]
        source: TryReserveError,
    },

    /// The request is larger than the block budget in force on this thread.
    #[error("a {requested}-byte block exceeds the {limit}-byte budget")]
    BudgetExceeded {
        /// Size of the refused block in bytes.
        requested: usize,
        /// Budget installed by [`crate::budget::limit_block_size`].
        limit: usize,
    },
}

impl AllocError {
    /// Size of the block that could not be allocated.
    #[must_use]
    pub fn requested(&self) -> usize {
        match self {
            Self::OutOfMemory { requested, .. } | Self::BudgetExceeded { requested, .. } => {
                *requested
            }
        }
    }
}
