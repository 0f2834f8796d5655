//! # fibdec-core
//!
//! Decimal big integers for the fibdec Fibonacci engine.
//! Implements schoolbook decimal arithmetic on small-buffer storage and the
//! Fast Doubling recurrence on top of it, plus a `num-bigint` reference.

pub mod arith;
pub mod calculator;
pub mod constants;
pub mod decimal;
pub mod estimate;
pub mod fastdoubling;
pub mod mode;
pub mod options;
pub mod reference;
pub mod registry;

// Re-exports
pub use arith::ArithError;
pub use calculator::{Calculator, CoreCalculator, FibCalculator, FibError};
pub use constants::{exit_codes, DEFAULT_INDEX, FIB_TABLE, MAX_FIB_U64};
pub use decimal::{DecimalBig, DisplayDecimal, ParseDecimalError};
pub use estimate::StorageEstimate;
pub use mode::Mode;
pub use options::Options;
pub use registry::{CalculatorFactory, DefaultFactory};

/// Compute F(n) with the decimal Fast Doubling calculator.
///
/// This is a convenience function for simple use cases. For memory limits
/// or other algorithms, use the `Calculator` trait directly.
///
/// # Example
/// ```
/// assert_eq!(fibdec_core::fibonacci(10).unwrap().to_string(), "55");
/// assert_eq!(fibdec_core::fibonacci(0).unwrap().to_string(), "0");
/// ```
pub fn fibonacci(n: u64) -> Result<DecimalBig, FibError> {
    use fastdoubling::DecimalFastDoubling;

    let calc = FibCalculator::new(std::sync::Arc::new(DecimalFastDoubling::new()));
    calc.calculate(n, &Options::default())
}
