//! Fast Doubling Fibonacci on decimal big integers.
//!
//! Uses the doubling identities:
//!   F(2k)   = F(k) * (2*F(k+1) - F(k))
//!   F(2k+1) = F(k)^2 + F(k+1)^2
//!
//! Starts from (F(1), F(2)) and walks the bits of the index below the top
//! one, from high to low, rotating registers instead of copying digits.

use std::mem;

use tracing::{debug, trace};

use crate::arith::{self, ArithError};
use crate::calculator::{CoreCalculator, FibError};
use crate::decimal::DecimalBig;
use crate::options::Options;

/// Registers for one Fast Doubling run.
///
/// `fk` and `fk1` hold F(k) and F(k+1); the rest are scratch that keeps its
/// storage from one step to the next.
pub struct CalculationState {
    /// Current F(k).
    pub fk: DecimalBig,
    /// Current F(k+1).
    pub fk1: DecimalBig,
    /// Scratch register 1.
    pub t1: DecimalBig,
    /// Scratch register 2.
    pub t2: DecimalBig,
}

impl CalculationState {
    /// Registers positioned at k = 1: F(1) = 1, F(2) = 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fk: DecimalBig::from_u64(1),
            fk1: DecimalBig::from_u64(1),
            t1: DecimalBig::zero(),
            t2: DecimalBig::zero(),
        }
    }

    /// k := 2k.
    pub fn double(&mut self) -> Result<(), ArithError> {
        // t1 = 2*F(k+1) - F(k); never negative since F(k+1) >= F(k).
        arith::add(&self.fk1, &self.fk1, &mut self.t1)?;
        arith::sub_assign(&mut self.t1, &self.fk)?;
        arith::mul(&self.fk, &self.t1, &mut self.t2)?;

        arith::square_in_place(&mut self.fk)?;
        arith::square_in_place(&mut self.fk1)?;
        arith::add(&self.fk, &self.fk1, &mut self.t1)?;

        mem::swap(&mut self.fk, &mut self.t2);
        mem::swap(&mut self.fk1, &mut self.t1);
        Ok(())
    }

    /// k := k + 1.
    pub fn advance(&mut self) -> Result<(), ArithError> {
        arith::add(&self.fk, &self.fk1, &mut self.t1)?;
        mem::swap(&mut self.fk, &mut self.fk1);
        mem::swap(&mut self.fk1, &mut self.t1);
        Ok(())
    }
}

impl Default for CalculationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of doubling steps needed for index `k`: `bit_length(k) - 1`.
#[must_use]
pub const fn doubling_iterations(k: u64) -> u32 {
    if k < 2 {
        0
    } else {
        63 - k.leading_zeros()
    }
}

fn run(k: u64) -> Result<DecimalBig, ArithError> {
    if k < 2 {
        return Ok(DecimalBig::from_u64(k));
    }

    let steps = doubling_iterations(k);
    debug!(index = k, steps, "starting fast doubling");

    let mut state = CalculationState::new();
    for bit in (0..steps).rev() {
        state.double()?;
        if (k >> bit) & 1 == 1 {
            state.advance()?;
        }
        trace!(bit, digits = state.fk.len(), "doubling step");
    }
    Ok(mem::take(&mut state.fk))
}

/// Compute F(`k`) into `result`, reusing its storage.
///
/// On failure `result` keeps its previous value.
pub fn fibonacci_into(k: u64, result: &mut DecimalBig) -> Result<(), ArithError> {
    let fk = run(k)?;
    arith::assign(result, &fk)?;
    debug!(index = k, digits = result.len(), "fast doubling finished");
    Ok(())
}

/// Compute F(`k`).
///
/// # Example
/// ```
/// use fibdec_core::fastdoubling::fibonacci;
///
/// assert_eq!(fibonacci(100).unwrap().to_string(), "354224848179261915075");
/// ```
pub fn fibonacci(k: u64) -> Result<DecimalBig, ArithError> {
    let mut result = DecimalBig::zero();
    fibonacci_into(k, &mut result)?;
    Ok(result)
}

/// Fast Doubling calculator on decimal big integers.
pub struct DecimalFastDoubling;

impl DecimalFastDoubling {
    /// Create a new `DecimalFastDoubling` calculator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for DecimalFastDoubling {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreCalculator for DecimalFastDoubling {
    fn calculate_core(&self, n: u64, _opts: &Options) -> Result<DecimalBig, FibError> {
        Ok(fibonacci(n)?)
    }

    fn name(&self) -> &'static str {
        "DecimalFastDoubling"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibdec_memory::budget::limit_block_size;
    use fibdec_memory::AllocError;

    fn fib(k: u64) -> String {
        fibonacci(k).unwrap().to_string()
    }

    #[test]
    fn base_cases() {
        assert_eq!(fib(0), "0");
        assert_eq!(fib(1), "1");
        assert_eq!(fib(2), "1");
        assert_eq!(fib(3), "2");
        assert_eq!(fib(5), "5");
    }

    #[test]
    fn known_values() {
        assert_eq!(fib(10), "55");
        assert_eq!(fib(50), "12586269025");
        assert_eq!(fib(100), "354224848179261915075");
        assert_eq!(fib(200), "280571172992510140037611932413038677189525");
    }

    #[test]
    fn matches_iterative_sum_for_small_indices() {
        // u128 holds up to F(186).
        let (mut a, mut b) = (0u128, 1u128);
        for k in 0..=186 {
            assert_eq!(fib(k), a.to_string(), "F({k})");
            (a, b) = (b, a.wrapping_add(b));
        }
    }

    #[test]
    fn f1000_has_209_digits() {
        let s = fib(1000);
        assert!(s.starts_with("43466557686937456435688527675040625802564"));
        assert!(s.ends_with("849228875"));
        assert_eq!(s.len(), 209);
    }

    #[test]
    fn doubling_iteration_count() {
        assert_eq!(doubling_iterations(0), 0);
        assert_eq!(doubling_iterations(1), 0);
        assert_eq!(doubling_iterations(2), 1);
        assert_eq!(doubling_iterations(3), 1);
        assert_eq!(doubling_iterations(4), 2);
        assert_eq!(doubling_iterations(500), 8);
        assert_eq!(doubling_iterations(u64::MAX), 63);
    }

    #[test]
    fn state_double_and_advance() {
        let mut state = CalculationState::new();
        state.double().unwrap();
        // k = 2: F(2) = 1, F(3) = 2
        assert_eq!(state.fk.to_u64(), Some(1));
        assert_eq!(state.fk1.to_u64(), Some(2));
        state.advance().unwrap();
        assert_eq!(state.fk.to_u64(), Some(2));
        assert_eq!(state.fk1.to_u64(), Some(3));
    }

    #[test]
    fn fibonacci_into_reuses_result() {
        let mut result = DecimalBig::zero();
        fibonacci_into(300, &mut result).unwrap();
        let capacity = result.capacity();
        fibonacci_into(10, &mut result).unwrap();
        assert_eq!(result.to_string(), "55");
        assert_eq!(result.capacity(), capacity);
    }

    #[test]
    fn allocation_failure_is_reported() {
        let mut result = DecimalBig::from_u64(99);
        let _guard = limit_block_size(Some(64));
        let err = fibonacci_into(1000, &mut result).unwrap_err();
        assert!(matches!(
            err,
            ArithError::Alloc(AllocError::BudgetExceeded { limit: 64, .. })
        ));
        assert_eq!(result.to_u64(), Some(99));
    }

    #[test]
    fn core_calculator_name() {
        let calc = DecimalFastDoubling::new();
        assert_eq!(calc.name(), "DecimalFastDoubling");
        let value = calc.calculate_core(94, &Options::default()).unwrap();
        assert_eq!(value.to_string(), "19740274219868223167");
    }
}
