//! Fast Doubling on `num-bigint`, used to cross-check the decimal engine.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::calculator::{CoreCalculator, FibError};
use crate::decimal::DecimalBig;
use crate::options::Options;

/// Convert a decimal value to a `BigUint`.
#[must_use]
pub fn to_biguint(value: &DecimalBig) -> BigUint {
    // Digits are base-10 values, least-significant first.
    BigUint::from_radix_le(value.digits(), 10).unwrap_or_default()
}

/// Convert a `BigUint` to a decimal value.
pub fn from_biguint(value: &BigUint) -> Result<DecimalBig, FibError> {
    Ok(value.to_string().parse()?)
}

/// F(n) as a `BigUint`.
#[must_use]
pub fn fibonacci_biguint(n: u64) -> BigUint {
    let mut fk = BigUint::zero();
    let mut fk1 = BigUint::one();
    for i in (0..64 - n.leading_zeros()).rev() {
        // F(2k) = F(k) * (2*F(k+1) - F(k)), F(2k+1) = F(k)^2 + F(k+1)^2
        let t = (&fk1 << 1u32) - &fk;
        let f2k = &fk * &t;
        let f2k1 = &fk * &fk + &fk1 * &fk1;
        fk = f2k;
        fk1 = f2k1;

        if (n >> i) & 1 == 1 {
            std::mem::swap(&mut fk, &mut fk1);
            fk1 += &fk;
        }
    }
    fk
}

/// Fast Doubling on `BigUint`, converted to decimal at the end.
pub struct ReferenceFastDoubling;

impl ReferenceFastDoubling {
    /// Create a new `ReferenceFastDoubling` calculator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReferenceFastDoubling {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreCalculator for ReferenceFastDoubling {
    fn calculate_core(&self, n: u64, _opts: &Options) -> Result<DecimalBig, FibError> {
        from_biguint(&fibonacci_biguint(n))
    }

    fn name(&self) -> &'static str {
        "ReferenceFastDoubling"
    }
}
