//! Per-thread upper bound on heap block size.
//!
//! A bound is installed with [`limit_block_size`] and lifted again when the
//! returned guard drops, so nested limits unwind in order. Every heap block
//! the buffer layer allocates on the thread is checked against it.

use std::cell::Cell;
use std::marker::PhantomData;

use crate::error::AllocError;

thread_local! {
    static BLOCK_LIMIT: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Restores the previous block limit of the current thread on drop.
#[must_use = "the limit is lifted as soon as the guard is dropped"]
pub struct BudgetGuard {
    previous: Option<usize>,
    // Tied to the thread whose limit it restores.
    _thread: PhantomData<*const ()>,
}

impl Drop for BudgetGuard {
    fn drop(&mut self) {
        BLOCK_LIMIT.with(|limit| limit.set(self.previous));
    }
}

/// Cap every heap block allocated on this thread at `bytes` until the guard drops.
///
/// `None` lifts any enclosing limit for the lifetime of the guard.
///
/// # Example
/// ```
/// use fibdec_memory::budget::{current_limit, limit_block_size};
///
/// {
///     let _guard = limit_block_size(Some(64));
///     assert_eq!(current_limit(), Some(64));
/// }
/// assert_eq!(current_limit(), None);
/// ```
pub fn limit_block_size(bytes: Option<usize>) -> BudgetGuard {
    let previous = BLOCK_LIMIT.with(|limit| limit.replace(bytes));
    BudgetGuard {
        previous,
        _thread: PhantomData,
    }
}

/// The block limit currently in force on this thread.
#[must_use]
pub fn current_limit() -> Option<usize> {
    BLOCK_LIMIT.with(Cell::get)
}

/// Check a block request against the current limit.
pub(crate) fn check(requested: usize) -> Result<(), AllocError> {
    match current_limit() {
        Some(limit) if requested > limit => Err(AllocError::BudgetExceeded { requested, limit }),
        _ => Ok(()),
    }
}

/// Parse a memory limit string (e.g., "1M", "64K", "512B", "4096").
///
/// An empty string means unlimited and yields 0.
///
/// # Errors
///
/// Returns an error string if the number cannot be parsed.
pub fn parse_memory_limit(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0);
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('G') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('M') {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('K') {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s, 1)
    };

    let value: usize = num_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid memory limit: {e}"))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("memory limit too large: {s}"))
}
