//! Arbitrary-precision non-negative decimal integers.
//!
//! [`DecimalBig`] is the calculation form: one raw digit value per byte,
//! least-significant first, in an [`SboBuffer`]. [`DisplayDecimal`] is the
//! display form of the same value: ASCII, most-significant first,
//! NUL-terminated. Each type always holds its own mode, so a value can never
//! be used in the wrong layout; converting between them either copies
//! (`to_*`) or rewrites the buffer in place (`into_*`).
//!
//! Both types keep at least one digit and no leading zeros; zero is a single
//! `0` digit.
//!
//! Values are exclusively owned. Nothing here locks: callers that share a
//! value across threads must serialize access to it themselves.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use fibdec_memory::{AllocError, SboBuffer};
use num_integer::Integer;

use crate::mode::{self, Mode};

/// Errors from parsing a decimal string or digit sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDecimalError {
    /// The input had no digits.
    #[error("cannot parse a decimal from empty input")]
    Empty,

    /// A byte was not a decimal digit.
    #[error("invalid digit {found:?} at position {position}")]
    InvalidDigit {
        /// Offset of the offending byte in the input.
        position: usize,
        /// The offending byte.
        found: char,
    },

    /// Storage for the digits could not be allocated.
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// A non-negative decimal integer in calculation form.
///
/// # Example
/// ```
/// use fibdec_core::DecimalBig;
///
/// let value = DecimalBig::from_u64(1205);
/// assert_eq!(value.digits(), &[5, 0, 2, 1]);
/// assert_eq!(value.to_string(), "1205");
///
/// let display = value.to_display_form().unwrap();
/// assert_eq!(display.as_bytes_with_nul(), b"1205\0");
/// ```
#[derive(PartialEq, Eq)]
pub struct DecimalBig {
    buf: SboBuffer,
}

impl DecimalBig {
    /// Layout of the digits held by this type.
    pub const MODE: Mode = Mode::Calculatable;

    /// The value zero.
    #[must_use]
    pub fn zero() -> Self {
        let mut buf = SboBuffer::new();
        // Fresh inline slots are zeroed, so this is the digit 0.
        buf.set_len(1);
        Self { buf }
    }

    /// Seed from a machine integer by repeated divmod by 10.
    ///
    /// Every `u64` fits in inline storage, so this never allocates.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        let mut seeded = Self {
            buf: SboBuffer::new(),
        };
        seeded.set_u64(value);
        seeded
    }

    /// Overwrite with a machine integer, keeping the current storage.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_u64(&mut self, value: u64) {
        // At most 20 digits; every buffer holds at least INLINE_CAPACITY.
        let slots = self.buf.slots_mut();
        let mut rest = value;
        let mut len = 0;
        loop {
            let (quotient, digit) = rest.div_rem(&10);
            slots[len] = digit as u8;
            len += 1;
            rest = quotient;
            if rest == 0 {
                break;
            }
        }
        self.buf.set_len(len);
    }

    /// Build from raw digit values, least-significant first.
    ///
    /// Leading (most-significant) zeros are dropped.
    pub fn from_raw_digits(digits: &[u8]) -> Result<Self, ParseDecimalError> {
        if digits.is_empty() {
            return Err(ParseDecimalError::Empty);
        }
        if let Some(position) = digits.iter().position(|&d| d > 9) {
            return Err(ParseDecimalError::InvalidDigit {
                position,
                found: char::from(digits[position]),
            });
        }
        let mut value = Self {
            buf: SboBuffer::from_slice(digits)?,
        };
        value.trim_leading_zeros();
        Ok(value)
    }

    /// Number of decimal digits.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Raw digit values, least-significant first.
    #[must_use]
    pub fn digits(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// The digit of weight 10^`index`, zero past the most-significant digit.
    #[must_use]
    pub fn digit(&self, index: usize) -> u8 {
        self.digits().get(index).copied().unwrap_or(0)
    }

    /// Whether the value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.digits() == [0]
    }

    /// Whether the digits still live in inline storage.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.buf.is_inline()
    }

    /// Digits storable before the next growth.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The value as a `u64`, if it fits.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        self.digits()
            .iter()
            .rev()
            .try_fold(0u64, |acc, &d| acc.checked_mul(10)?.checked_add(u64::from(d)))
    }

    /// Replace this value with a copy of `from`, reusing storage where possible.
    pub fn assign(&mut self, from: &DecimalBig) -> Result<(), AllocError> {
        self.buf.assign(&from.buf)
    }

    /// Deep copy.
    pub fn try_clone(&self) -> Result<Self, AllocError> {
        Ok(Self {
            buf: self.buf.try_clone()?,
        })
    }

    /// Set to zero, keeping the current storage.
    pub fn set_zero(&mut self) {
        self.buf.slots_mut()[0] = 0;
        self.buf.set_len(1);
    }

    /// Free any heap storage and set to zero.
    pub fn release(&mut self) {
        self.buf.release();
        self.buf.set_len(1);
    }

    /// Copy into display form, leaving `self` untouched.
    pub fn to_display_form(&self) -> Result<DisplayDecimal, AllocError> {
        Ok(self.try_clone()?.into_display_form())
    }

    /// Rewrite the buffer in place into display form.
    #[must_use]
    pub fn into_display_form(mut self) -> DisplayDecimal {
        mode::convert(self.buf.as_bytes_mut(), Self::MODE, DisplayDecimal::MODE);
        DisplayDecimal { buf: self.buf }
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut SboBuffer {
        &mut self.buf
    }

    /// Drop most-significant zero digits, never going below one digit.
    pub(crate) fn trim_leading_zeros(&mut self) {
        let len = self
            .digits()
            .iter()
            .rposition(|&d| d != 0)
            .map_or(1, |top| top + 1);
        self.buf.set_len(len);
    }
}

impl Default for DecimalBig {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u64> for DecimalBig {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u32> for DecimalBig {
    fn from(value: u32) -> Self {
        Self::from_u64(u64::from(value))
    }
}

impl Ord for DecimalBig {
    /// Longer values are larger; equal lengths compare digit by digit from
    /// the most-significant end.
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.digits().iter().rev().cmp(other.digits().iter().rev()))
    }
}

impl PartialOrd for DecimalBig {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DecimalBig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &d in self.digits().iter().rev() {
            fmt::Write::write_char(f, char::from(b'0' + d))?;
        }
        Ok(())
    }
}

impl fmt::Debug for DecimalBig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DecimalBig")
            .field(&format_args!("{self}"))
            .finish()
    }
}

impl FromStr for DecimalBig {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.is_empty() {
            return Err(ParseDecimalError::Empty);
        }
        if let Some(position) = bytes.iter().position(|b| !b.is_ascii_digit()) {
            return Err(ParseDecimalError::InvalidDigit {
                position,
                found: s[position..].chars().next().unwrap_or('\0'),
            });
        }
        let display = DisplayDecimal {
            buf: SboBuffer::from_slice(bytes)?,
        };
        let mut value = display.into_calculation_form();
        value.trim_leading_zeros();
        Ok(value)
    }
}

/// A decimal integer in display form: an ASCII, NUL-terminated string.
#[derive(PartialEq, Eq)]
pub struct DisplayDecimal {
    buf: SboBuffer,
}

impl DisplayDecimal {
    /// Layout of the digits held by this type.
    pub const MODE: Mode = Mode::Outputable;

    /// Number of digits, terminator excluded.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// ASCII digits, most-significant first.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// ASCII digits followed by the NUL terminator.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.buf.as_bytes_with_nul()
    }

    /// The digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Display digits are always ASCII.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Copy back into calculation form, leaving `self` untouched.
    pub fn to_calculation_form(&self) -> Result<DecimalBig, AllocError> {
        let copy = Self {
            buf: self.buf.try_clone()?,
        };
        Ok(copy.into_calculation_form())
    }

    /// Rewrite the buffer in place into calculation form.
    #[must_use]
    pub fn into_calculation_form(mut self) -> DecimalBig {
        mode::convert(self.buf.as_bytes_mut(), Self::MODE, DecimalBig::MODE);
        DecimalBig { buf: self.buf }
    }
}

impl fmt::Display for DisplayDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DisplayDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DisplayDecimal").field(&self.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_one_digit() {
        let zero = DecimalBig::zero();
        assert_eq!(zero.len(), 1);
        assert_eq!(zero.digits(), &[0]);
        assert!(zero.is_zero());
        assert_eq!(zero.to_string(), "0");
        assert_eq!(DecimalBig::from_u64(0), zero);
    }

    #[test]
    fn from_u64_is_least_significant_first() {
        let value = DecimalBig::from_u64(9_081_726);
        assert_eq!(value.digits(), &[6, 2, 7, 1, 8, 0, 9]);
        assert_eq!(value.len(), 7);
    }

    #[test]
    fn from_u64_max_stays_inline() {
        let value = DecimalBig::from_u64(u64::MAX);
        assert!(value.is_inline());
        assert_eq!(value.to_string(), u64::MAX.to_string());
        assert_eq!(value.to_u64(), Some(u64::MAX));
    }

    #[test]
    fn to_u64_overflow() {
        let big: DecimalBig = "18446744073709551616".parse().unwrap();
        assert_eq!(big.to_u64(), None);
    }

    #[test]
    fn parse_strips_leading_zeros() {
        let value: DecimalBig = "000120".parse().unwrap();
        assert_eq!(value.to_string(), "120");
        let zero: DecimalBig = "0000".parse().unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero.len(), 1);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!("".parse::<DecimalBig>(), Err(ParseDecimalError::Empty));
        assert_eq!(
            "12a4".parse::<DecimalBig>(),
            Err(ParseDecimalError::InvalidDigit {
                position: 2,
                found: 'a'
            })
        );
        assert!("-5".parse::<DecimalBig>().is_err());
    }

    #[test]
    fn parse_long_value_uses_heap() {
        let text = "1234567890".repeat(5);
        let value: DecimalBig = text.parse().unwrap();
        assert!(!value.is_inline());
        assert_eq!(value.to_string(), text);
    }

    #[test]
    fn from_raw_digits_validates() {
        assert_eq!(
            DecimalBig::from_raw_digits(&[1, 2, 0, 0]).unwrap().to_string(),
            "21"
        );
        assert_eq!(
            DecimalBig::from_raw_digits(&[]),
            Err(ParseDecimalError::Empty)
        );
        assert!(matches!(
            DecimalBig::from_raw_digits(&[1, 10]),
            Err(ParseDecimalError::InvalidDigit { position: 1, .. })
        ));
    }

    #[test]
    fn compare_by_length_then_digits() {
        let small = DecimalBig::from_u64(999);
        let large = DecimalBig::from_u64(1000);
        assert_eq!(small.cmp(&large), Ordering::Less);
        assert_eq!(large.cmp(&small), Ordering::Greater);

        let a = DecimalBig::from_u64(4521);
        let b = DecimalBig::from_u64(4512);
        assert_eq!(a.cmp(&b), Ordering::Greater);
        assert_eq!(a.cmp(&DecimalBig::from_u64(4521)), Ordering::Equal);
    }

    #[test]
    fn display_form_roundtrip_is_lossless() {
        let value: DecimalBig = "31415926535897932384626433832795".parse().unwrap();
        let display = value.to_display_form().unwrap();
        assert_eq!(display.as_str(), "31415926535897932384626433832795");
        assert_eq!(display.as_bytes_with_nul().last(), Some(&0));

        let back = display.into_calculation_form();
        assert_eq!(back, value);
    }

    #[test]
    fn display_str_matches_display_impl() {
        for value in [DecimalBig::zero(), DecimalBig::from_u64(u64::MAX)] {
            let text = value.to_string();
            let display = value.into_display_form();
            assert_eq!(display.as_str(), text);
            assert_eq!(format!("{display}"), text);
            assert_eq!(format!("{display:?}"), format!("DisplayDecimal({text:?})"));
        }
    }

    #[test]
    fn in_place_conversion_keeps_storage() {
        let value = DecimalBig::from_u64(1_234_567);
        let display = value.into_display_form();
        assert_eq!(display.as_bytes(), b"1234567");
        assert_eq!(display.len(), 7);
        let value = display.into_calculation_form();
        assert_eq!(value.digits(), &[7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn to_calculation_form_copies() {
        let display = DecimalBig::from_u64(42).into_display_form();
        let value = display.to_calculation_form().unwrap();
        assert_eq!(value.to_u64(), Some(42));
        assert_eq!(display.as_str(), "42");
    }

    #[test]
    fn assign_and_release() {
        let big: DecimalBig = "9".repeat(40).parse().unwrap();
        let mut target = DecimalBig::from_u64(7);
        target.assign(&big).unwrap();
        assert_eq!(target, big);

        target.release();
        assert!(target.is_zero());
        assert!(target.is_inline());
    }

    #[test]
    fn set_zero_keeps_heap_storage() {
        let mut value: DecimalBig = "1".repeat(30).parse().unwrap();
        value.set_zero();
        assert!(value.is_zero());
        assert!(!value.is_inline());
    }

    #[test]
    fn debug_shows_decimal_value() {
        assert_eq!(format!("{:?}", DecimalBig::from_u64(55)), "DecimalBig(55)");
        assert_eq!(
            format!("{:?}", DecimalBig::from_u64(55).into_display_form()),
            "DisplayDecimal(\"55\")"
        );
    }
}
