//! Per-thread allocation statistics for the buffer layer.
//!
//! Computations run on one thread from start to finish, so counters are kept
//! thread-local: a caller can `reset`, compute, and `snapshot` without seeing
//! activity from other threads.

use std::cell::Cell;

/// Allocation activity recorded on one thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Buffers moved from inline to heap storage.
    pub promotions: u64,
    /// Successful capacity extensions (promotions included).
    pub extensions: u64,
    /// Heap blocks allocated by any path.
    pub heap_blocks: u64,
    /// Total bytes across those heap blocks.
    pub heap_bytes: u64,
    /// Block requests that were refused.
    pub failures: u64,
}

struct ThreadStats {
    promotions: Cell<u64>,
    extensions: Cell<u64>,
    heap_blocks: Cell<u64>,
    heap_bytes: Cell<u64>,
    failures: Cell<u64>,
}

impl ThreadStats {
    const fn new() -> Self {
        Self {
            promotions: Cell::new(0),
            extensions: Cell::new(0),
            heap_blocks: Cell::new(0),
            heap_bytes: Cell::new(0),
            failures: Cell::new(0),
        }
    }
}

thread_local! {
    static STATS: ThreadStats = const { ThreadStats::new() };
}

fn bump(counter: &Cell<u64>, by: u64) {
    counter.set(counter.get().saturating_add(by));
}

/// Take a snapshot of this thread's counters.
#[must_use]
pub fn snapshot() -> AllocStats {
    STATS.with(|s| AllocStats {
        promotions: s.promotions.get(),
        extensions: s.extensions.get(),
        heap_blocks: s.heap_blocks.get(),
        heap_bytes: s.heap_bytes.get(),
        failures: s.failures.get(),
    })
}

/// Reset this thread's counters.
pub fn reset() {
    STATS.with(|s| {
        s.promotions.set(0);
        s.extensions.set(0);
        s.heap_blocks.set(0);
        s.heap_bytes.set(0);
        s.failures.set(0);
    });
}

pub(crate) fn record_extension(promoted: bool) {
    STATS.with(|s| {
        bump(&s.extensions, 1);
        if promoted {
            bump(&s.promotions, 1);
        }
    });
}

pub(crate) fn record_block(bytes: usize) {
    STATS.with(|s| {
        bump(&s.heap_blocks, 1);
        bump(&s.heap_bytes, bytes as u64);
    });
}

pub(crate) fn record_failure() {
    STATS.with(|s| bump(&s.failures, 1));
}
