//! Schoolbook arithmetic on [`DecimalBig`] values.
//!
//! Results are written into a caller-supplied value whose storage is reused
//! and grown on demand, one digit column at a time. When a growth fails
//! after digits were already written into the result, the result is reset
//! to zero and the allocation error is returned. Products are built in
//! scratch storage, so a failed multiplication leaves its target untouched.
//!
//! The three-operand forms take the result by unique reference, so it can
//! never alias an operand. The `*_assign` and [`square_in_place`] forms cover
//! the in-place cases.

use std::cmp::Ordering;

use fibdec_memory::{AllocError, SboBuffer};

use crate::decimal::DecimalBig;

/// Errors from the arithmetic engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArithError {
    /// A result buffer could not grow.
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// The subtrahend is larger than the minuend; negative values are not
    /// representable.
    #[error("subtraction would go below zero")]
    Underflow,
}

/// Write `digit` at column `index`, growing `out` first when the column sits
/// at its capacity. Columns below `index` are live and survive the growth.
fn put_digit(out: &mut SboBuffer, index: usize, digit: u8) -> Result<(), AllocError> {
    if index >= out.capacity() {
        out.set_len(index);
        out.extend_capacity()?;
    }
    out.slots_mut()[index] = digit;
    Ok(())
}

/// Grow `out` until `column` is addressable, keeping the first `live` columns.
fn reserve_column(out: &mut SboBuffer, column: usize, live: usize) -> Result<(), AllocError> {
    while column >= out.capacity() {
        out.set_len(live);
        out.extend_capacity()?;
    }
    Ok(())
}

fn settle(result: &mut DecimalBig, outcome: Result<(), AllocError>) -> Result<(), ArithError> {
    outcome.map_err(|err| {
        result.set_zero();
        ArithError::Alloc(err)
    })
}

fn add_digits(long: &[u8], short: &[u8], out: &mut SboBuffer) -> Result<(), AllocError> {
    let mut carry = 0;
    for (i, (&a, &b)) in long.iter().zip(short).enumerate() {
        let sum = a + b + carry;
        put_digit(out, i, sum % 10)?;
        carry = sum / 10;
    }
    for (i, &a) in long.iter().enumerate().skip(short.len()) {
        let sum = a + carry;
        put_digit(out, i, sum % 10)?;
        carry = sum / 10;
    }

    let mut len = long.len();
    if carry != 0 {
        put_digit(out, len, carry)?;
        len += 1;
    }
    out.set_len(len);
    Ok(())
}

/// `result = op1 + op2`.
///
/// The result may not alias either operand; the borrow checker refuses it:
///
/// ```compile_fail
/// use fibdec_core::arith::add;
/// use fibdec_core::DecimalBig;
///
/// let mut x = DecimalBig::from_u64(21);
/// add(&x, &x, &mut x).unwrap();
/// ```
///
/// Use [`add_assign`] to accumulate in place.
///
/// # Example
/// ```
/// use fibdec_core::arith::add;
/// use fibdec_core::DecimalBig;
///
/// let mut sum = DecimalBig::zero();
/// add(&DecimalBig::from_u64(999), &DecimalBig::from_u64(1), &mut sum).unwrap();
/// assert_eq!(sum.to_string(), "1000");
/// ```
pub fn add(op1: &DecimalBig, op2: &DecimalBig, result: &mut DecimalBig) -> Result<(), ArithError> {
    let (long, short) = if op1.len() >= op2.len() {
        (op1.digits(), op2.digits())
    } else {
        (op2.digits(), op1.digits())
    };
    let outcome = add_digits(long, short, result.buffer_mut());
    settle(result, outcome)
}

fn accumulate(out: &mut SboBuffer, rhs: &[u8]) -> Result<(), AllocError> {
    let own = out.len();
    let len = own.max(rhs.len());
    let mut carry = 0;
    for i in 0..len {
        // Growth only happens at or past the old length, so slot i is intact.
        let a = if i < own { out.slots_mut()[i] } else { 0 };
        let sum = a + rhs.get(i).copied().unwrap_or(0) + carry;
        put_digit(out, i, sum % 10)?;
        carry = sum / 10;
    }
    let mut total = len;
    if carry != 0 {
        put_digit(out, total, carry)?;
        total += 1;
    }
    out.set_len(total);
    Ok(())
}

/// `acc += rhs`.
pub fn add_assign(acc: &mut DecimalBig, rhs: &DecimalBig) -> Result<(), ArithError> {
    let outcome = accumulate(acc.buffer_mut(), rhs.digits());
    settle(acc, outcome)
}

fn sub_digits(minuend: &[u8], subtrahend: &[u8], out: &mut SboBuffer) -> Result<(), AllocError> {
    let mut borrow = 0;
    for (i, &m) in minuend.iter().enumerate() {
        let s = subtrahend.get(i).copied().unwrap_or(0) + borrow;
        let digit = if m >= s {
            borrow = 0;
            m - s
        } else {
            borrow = 1;
            m + 10 - s
        };
        put_digit(out, i, digit)?;
    }
    out.set_len(minuend.len());
    Ok(())
}

/// `result = op1 - op2`.
///
/// Returns [`ArithError::Underflow`] and leaves `result` unchanged when
/// `op1 < op2`. Equal operands give zero.
pub fn sub(op1: &DecimalBig, op2: &DecimalBig, result: &mut DecimalBig) -> Result<(), ArithError> {
    match op1.cmp(op2) {
        Ordering::Less => return Err(ArithError::Underflow),
        Ordering::Equal => {
            result.set_zero();
            return Ok(());
        }
        Ordering::Greater => {}
    }
    let outcome = sub_digits(op1.digits(), op2.digits(), result.buffer_mut());
    settle(result, outcome)?;
    result.trim_leading_zeros();
    Ok(())
}

/// `acc -= rhs`.
///
/// Returns [`ArithError::Underflow`] and leaves `acc` unchanged when
/// `acc < rhs`. Never allocates.
pub fn sub_assign(acc: &mut DecimalBig, rhs: &DecimalBig) -> Result<(), ArithError> {
    match (*acc).cmp(rhs) {
        Ordering::Less => return Err(ArithError::Underflow),
        Ordering::Equal => {
            acc.set_zero();
            return Ok(());
        }
        Ordering::Greater => {}
    }
    let mut borrow = 0;
    for (i, m) in acc.buffer_mut().as_bytes_mut().iter_mut().enumerate() {
        let s = rhs.digit(i) + borrow;
        if *m >= s {
            *m -= s;
            borrow = 0;
        } else {
            *m = *m + 10 - s;
            borrow = 1;
        }
    }
    acc.trim_leading_zeros();
    Ok(())
}

/// Long multiplication into a fresh scratch value.
///
/// Each partial product is folded into its column immediately and the tens
/// carried into the next column, so a column never holds more than 18 between
/// steps and every finished column is a single digit.
fn product(a: &[u8], b: &[u8]) -> Result<DecimalBig, AllocError> {
    let mut scratch = DecimalBig::zero();
    let out = scratch.buffer_mut();
    let mut live = 0;

    for (i, &d2) in b.iter().enumerate() {
        for (j, &d1) in a.iter().enumerate() {
            let column = i + j;
            reserve_column(out, column + 1, live)?;

            let cells = out.slots_mut();
            while live <= column + 1 {
                cells[live] = 0;
                live += 1;
            }
            let num = d1 * d2 + cells[column];
            cells[column] = num % 10;
            cells[column + 1] += num / 10;
        }
    }

    out.set_len(live);
    scratch.trim_leading_zeros();
    Ok(scratch)
}

/// `result = op1 * op2`.
///
/// The product is built in scratch storage and assigned into `result` last,
/// so on failure `result` still holds its old value.
pub fn mul(op1: &DecimalBig, op2: &DecimalBig, result: &mut DecimalBig) -> Result<(), ArithError> {
    let p = product(op1.digits(), op2.digits())?;
    result.assign(&p)?;
    Ok(())
}

/// `acc *= rhs`. On failure `acc` is unchanged.
pub fn mul_assign(acc: &mut DecimalBig, rhs: &DecimalBig) -> Result<(), ArithError> {
    let p = product(acc.digits(), rhs.digits())?;
    acc.assign(&p)?;
    Ok(())
}

/// `x = x * x`. On failure `x` is unchanged.
///
/// # Example
/// ```
/// use fibdec_core::arith::square_in_place;
/// use fibdec_core::DecimalBig;
///
/// let mut x = DecimalBig::from_u64(99_999);
/// square_in_place(&mut x).unwrap();
/// assert_eq!(x.to_string(), "9999800001");
/// ```
pub fn square_in_place(x: &mut DecimalBig) -> Result<(), ArithError> {
    let p = product(x.digits(), x.digits())?;
    x.assign(&p)?;
    Ok(())
}

/// `to = from`.
pub fn assign(to: &mut DecimalBig, from: &DecimalBig) -> Result<(), ArithError> {
    to.assign(from).map_err(ArithError::from)
}
