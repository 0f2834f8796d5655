//! Calculator traits and the `FibCalculator` decorator.
//!
//! `Calculator` is the public trait consumed by the front ends.
//! `CoreCalculator` is the internal trait implemented by algorithms.
//! `FibCalculator` is a decorator that adds the index limit, the table fast
//! path (n <= 93) and the per-thread block budget.

use std::sync::Arc;

use fibdec_memory::budget::limit_block_size;
use fibdec_memory::AllocError;
use tracing::debug;

use crate::arith::ArithError;
use crate::constants::{FIB_TABLE, MAX_FIB_U64};
use crate::decimal::{DecimalBig, ParseDecimalError};
use crate::options::Options;

/// Error type for Fibonacci calculations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FibError {
    /// A buffer could not grow to hold an intermediate or final value.
    #[error("allocation failed: {0}")]
    Allocation(#[from] AllocError),

    /// A calculation error occurred.
    #[error("calculation error: {0}")]
    Calculation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The index is above the configured maximum.
    #[error("index {index} exceeds the maximum index {max}")]
    IndexOutOfRange {
        /// Requested index.
        index: u64,
        /// Configured maximum.
        max: u64,
    },

    /// Results from different algorithms don't match.
    #[error("result mismatch between algorithms at index {index}")]
    Mismatch {
        /// Index whose results disagreed.
        index: u64,
    },
}

impl From<ArithError> for FibError {
    fn from(err: ArithError) -> Self {
        match err {
            ArithError::Alloc(alloc) => Self::Allocation(alloc),
            ArithError::Underflow => Self::Calculation(err.to_string()),
        }
    }
}

impl From<ParseDecimalError> for FibError {
    fn from(err: ParseDecimalError) -> Self {
        match err {
            ParseDecimalError::Alloc(alloc) => Self::Allocation(alloc),
            other => Self::Calculation(other.to_string()),
        }
    }
}

/// Public trait for Fibonacci calculators.
pub trait Calculator: Send + Sync {
    /// Calculate F(n) with the given options.
    fn calculate(&self, n: u64, opts: &Options) -> Result<DecimalBig, FibError>;

    /// Get the name of this calculator.
    fn name(&self) -> &str;
}

/// Internal trait for algorithm implementations.
/// Wrapped by `FibCalculator`, which adds the fast path and the limits.
pub trait CoreCalculator: Send + Sync {
    /// Perform the core calculation.
    fn calculate_core(&self, n: u64, opts: &Options) -> Result<DecimalBig, FibError>;

    /// Get the name of this algorithm.
    fn name(&self) -> &str;
}

/// Decorator that wraps a `CoreCalculator` with the fast path and limits.
pub struct FibCalculator {
    inner: Arc<dyn CoreCalculator>,
}

impl FibCalculator {
    /// Create a new `FibCalculator` wrapping the given core calculator.
    #[must_use]
    pub fn new(inner: Arc<dyn CoreCalculator>) -> Self {
        Self { inner }
    }

    /// Fast path for small n (n <= 93) using precomputed table.
    #[allow(clippy::cast_possible_truncation)]
    fn calculate_small(n: u64) -> DecimalBig {
        DecimalBig::from_u64(FIB_TABLE[n as usize])
    }
}

impl Calculator for FibCalculator {
    fn calculate(&self, n: u64, opts: &Options) -> Result<DecimalBig, FibError> {
        if let Some(max) = opts.index_limit() {
            if n > max {
                return Err(FibError::IndexOutOfRange { index: n, max });
            }
        }

        if n <= MAX_FIB_U64 {
            return Ok(Self::calculate_small(n));
        }

        let _budget = limit_block_size(opts.block_limit());
        debug!(
            algorithm = self.inner.name(),
            index = n,
            block_limit = ?opts.block_limit(),
            "delegating to core calculator"
        );
        self.inner.calculate_core(n, opts)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
