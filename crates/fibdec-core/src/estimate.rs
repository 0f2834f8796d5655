//! Digit count and storage estimates for a Fibonacci computation.

use fibdec_memory::{BLOCK_ALIGNMENT, INLINE_CAPACITY};

use crate::constants::DIGITS_PER_INDEX;

/// Storage estimate for computing F(n).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEstimate {
    /// Approximate number of decimal digits in F(n).
    pub digits: usize,
    /// Heap bytes for one value of that size (0 when it fits inline).
    pub block_bytes: usize,
    /// Largest single block the computation asks for.
    pub peak_block_bytes: usize,
}

impl StorageEstimate {
    /// Estimate storage for F(n).
    ///
    /// The largest request comes from the product scratch of the last
    /// doubling step, which holds roughly twice the digits of F(n/2+1)
    /// and therefore about the digits of F(n).
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn estimate(n: u64) -> Self {
        let digits = ((n as f64 * DIGITS_PER_INDEX).ceil() as usize).max(1);
        let block_bytes = block_for(digits);
        Self {
            digits,
            block_bytes,
            // Capacity doubles, so a block can be up to twice the need.
            peak_block_bytes: block_bytes * 2,
        }
    }

    /// Whether the peak block fits under `limit`. `None` means unlimited.
    #[must_use]
    pub fn fits_in(&self, limit: Option<usize>) -> bool {
        match limit {
            None => true,
            Some(l) => self.peak_block_bytes <= l,
        }
    }
}

fn block_for(digits: usize) -> usize {
    if digits <= INLINE_CAPACITY {
        0
    } else {
        (digits + 1).next_multiple_of(BLOCK_ALIGNMENT)
    }
}
