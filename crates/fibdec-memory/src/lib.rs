//! # fibdec-memory
//!
//! Byte storage for the `fibdec` workspace.
//!
//! Provides the inline/heap `SboBuffer`, the allocation error surfaced by every
//! growth path, a per-thread heap block budget, and per-thread allocation stats.
#![warn(missing_docs)]

pub mod budget;
pub mod error;
pub mod sbo;
pub mod stats;

pub use error::AllocError;
pub use sbo::{SboBuffer, BLOCK_ALIGNMENT, INLINE_CAPACITY};
