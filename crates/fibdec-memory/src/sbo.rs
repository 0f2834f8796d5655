//! Small-buffer-optimized growable byte storage.
//!
//! Short contents live inline in the value itself. The first time more than
//! [`INLINE_CAPACITY`] bytes are needed the contents move to an owned heap
//! block and stay on the heap from then on. Contents are always followed by a
//! NUL byte, so the usable capacity is one less than the storage behind it.
//!
//! Heap blocks are released exactly once: when the buffer drops, when
//! [`SboBuffer::release`] is called, or when a growth replaces the block.

use tracing::{trace, warn};

use crate::budget;
use crate::error::AllocError;
use crate::stats;

/// Bytes usable without touching the heap.
pub const INLINE_CAPACITY: usize = 23;

/// Heap block sizes (terminator included) are multiples of this.
pub const BLOCK_ALIGNMENT: usize = 16;

#[derive(Debug)]
enum Storage {
    Inline {
        bytes: [u8; INLINE_CAPACITY + 1],
        len: u8,
    },
    Heap {
        block: Box<[u8]>,
        len: usize,
    },
}

/// Growable, NUL-terminated byte buffer with inline small storage.
///
/// # Example
/// ```
/// use fibdec_memory::{SboBuffer, INLINE_CAPACITY};
///
/// let mut buf = SboBuffer::new();
/// for _ in 0..INLINE_CAPACITY {
///     buf.push(b'7').unwrap();
/// }
/// assert!(buf.is_inline());
///
/// buf.push(b'7').unwrap();
/// assert!(!buf.is_inline());
/// assert_eq!(buf.capacity(), 47);
/// assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));
/// ```
#[derive(Debug)]
pub struct SboBuffer {
    storage: Storage,
}

/// Allocate a zeroed block of `size` bytes, honoring the thread's budget.
fn allocate(size: usize) -> Result<Box<[u8]>, AllocError> {
    let outcome = budget::check(size).and_then(|()| {
        let mut block = Vec::new();
        block
            .try_reserve_exact(size)
            .map_err(|source| AllocError::OutOfMemory {
                requested: size,
                source,
            })?;
        block.resize(size, 0);
        Ok(block.into_boxed_slice())
    });

    match &outcome {
        Ok(_) => stats::record_block(size),
        Err(err) => {
            stats::record_failure();
            warn!(%err, "buffer allocation failed");
        }
    }
    outcome
}

impl SboBuffer {
    /// Create an empty inline buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: Storage::Inline {
                bytes: [0; INLINE_CAPACITY + 1],
                len: 0,
            },
        }
    }

    /// Create an empty buffer able to hold `capacity` bytes without growing.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        if capacity <= INLINE_CAPACITY {
            return Ok(Self::new());
        }
        let block = allocate((capacity + 1).next_multiple_of(BLOCK_ALIGNMENT))?;
        Ok(Self {
            storage: Storage::Heap { block, len: 0 },
        })
    }

    /// Create a buffer holding a copy of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AllocError> {
        let mut buf = Self::with_capacity(bytes.len())?;
        buf.slots_mut()[..bytes.len()].copy_from_slice(bytes);
        buf.set_len(bytes.len());
        Ok(buf)
    }

    /// Whether the contents are stored inline.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline { .. })
    }

    fn raw(&self) -> &[u8] {
        match &self.storage {
            Storage::Inline { bytes, .. } => bytes,
            Storage::Heap { block, .. } => block,
        }
    }

    fn raw_mut(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Storage::Inline { bytes, .. } => bytes,
            Storage::Heap { block, .. } => block,
        }
    }

    /// Bytes usable before the next growth, terminator excluded.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw().len() - 1
    }

    /// Number of bytes in use.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Inline { len, .. } => usize::from(*len),
            Storage::Heap { len, .. } => *len,
        }
    }

    /// Whether no bytes are in use.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set the number of bytes in use and write the terminator after them.
    ///
    /// Bytes below `len` keep whatever was last written to them through
    /// [`slots_mut`](Self::slots_mut).
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds [`capacity`](Self::capacity).
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_len(&mut self, len: usize) {
        assert!(
            len <= self.capacity(),
            "length {len} exceeds capacity {}",
            self.capacity()
        );
        match &mut self.storage {
            Storage::Inline { bytes, len: stored } => {
                bytes[len] = 0;
                // len <= INLINE_CAPACITY, checked above
                *stored = len as u8;
            }
            Storage::Heap { block, len: stored } => {
                block[len] = 0;
                *stored = len;
            }
        }
    }

    /// The bytes in use.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw()[..self.len()]
    }

    /// The bytes in use, mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len();
        &mut self.raw_mut()[..len]
    }

    /// The bytes in use followed by the NUL terminator.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.raw()[..=self.len()]
    }

    /// Every writable slot, `0..capacity`, regardless of the current length.
    ///
    /// The slice is invalidated by any call that may grow the buffer.
    pub fn slots_mut(&mut self) -> &mut [u8] {
        let capacity = self.capacity();
        &mut self.raw_mut()[..capacity]
    }

    /// Append one byte, growing when full.
    pub fn push(&mut self, byte: u8) -> Result<(), AllocError> {
        let len = self.len();
        if len == self.capacity() {
            self.extend_capacity()?;
        }
        self.slots_mut()[len] = byte;
        self.set_len(len + 1);
        Ok(())
    }

    /// Double the capacity, rounded so the new block is a multiple of
    /// [`BLOCK_ALIGNMENT`] bytes, and move the contents into it.
    ///
    /// Copies `len + 1` bytes. On failure the buffer is left untouched.
    /// Returns the new capacity.
    pub fn extend_capacity(&mut self) -> Result<usize, AllocError> {
        let old_capacity = self.capacity();
        let len = self.len();
        let new_capacity = (old_capacity * 2).next_multiple_of(BLOCK_ALIGNMENT) - 1;

        let mut block = allocate(new_capacity + 1)?;
        block[..=len].copy_from_slice(self.as_bytes_with_nul());

        let promoted = self.is_inline();
        self.storage = Storage::Heap { block, len };
        stats::record_extension(promoted);
        trace!(
            from = old_capacity,
            to = new_capacity,
            promoted,
            "extended buffer capacity"
        );
        Ok(new_capacity)
    }

    /// Replace the contents with a copy of `from`'s.
    ///
    /// The current storage is reused when it can hold `from`'s contents;
    /// otherwise a block of `from`'s capacity is allocated and the old one
    /// freed. A heap buffer never moves back inline. On failure the buffer is
    /// left untouched.
    pub fn assign(&mut self, from: &SboBuffer) -> Result<(), AllocError> {
        let len = from.len();
        if len > self.capacity() {
            let block = allocate(from.capacity() + 1)?;
            self.storage = Storage::Heap { block, len: 0 };
        }
        self.slots_mut()[..len].copy_from_slice(from.as_bytes());
        self.set_len(len);
        Ok(())
    }

    /// Deep copy into a buffer sized for the contents.
    pub fn try_clone(&self) -> Result<Self, AllocError> {
        Self::from_slice(self.as_bytes())
    }

    /// Free any heap block and return to the empty inline state.
    pub fn release(&mut self) {
        self.storage = Self::new().storage;
    }
}

impl Default for SboBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SboBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for SboBuffer {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::limit_block_size;
    use proptest::prelude::*;

    fn filled(len: usize) -> SboBuffer {
        let mut buf = SboBuffer::new();
        for i in 0..len {
            buf.push(b'0' + (i % 10) as u8).unwrap();
        }
        buf
    }

    #[test]
    fn new_buffer_is_empty_and_inline() {
        let buf = SboBuffer::new();
        assert!(buf.is_inline());
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), INLINE_CAPACITY);
        assert_eq!(buf.as_bytes_with_nul(), &[0]);
    }

    #[test]
    fn fills_inline_capacity_without_allocating() {
        stats::reset();
        let buf = filled(INLINE_CAPACITY);
        assert!(buf.is_inline());
        assert_eq!(buf.len(), INLINE_CAPACITY);
        assert_eq!(buf.as_bytes_with_nul()[INLINE_CAPACITY], 0);
        assert_eq!(stats::snapshot().heap_blocks, 0);
    }

    #[test]
    fn push_past_inline_capacity_promotes() {
        stats::reset();
        let buf = filled(INLINE_CAPACITY + 1);
        assert!(!buf.is_inline());
        assert_eq!(buf.capacity(), 47);
        assert_eq!(buf.as_bytes(), b"012345678901234567890123");
        assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));

        let snap = stats::snapshot();
        assert_eq!(snap.promotions, 1);
        assert_eq!(snap.extensions, 1);
        assert_eq!(snap.heap_bytes, 48);
    }

    #[test]
    fn extend_capacity_doubles_and_aligns() {
        let mut buf = SboBuffer::new();
        assert_eq!(buf.extend_capacity().unwrap(), 47);
        assert_eq!(buf.extend_capacity().unwrap(), 95);
        assert_eq!(buf.extend_capacity().unwrap(), 191);
        assert_eq!((buf.capacity() + 1) % BLOCK_ALIGNMENT, 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn extend_capacity_preserves_contents() {
        let mut buf = SboBuffer::from_slice(b"fibonacci").unwrap();
        buf.extend_capacity().unwrap();
        assert_eq!(buf.as_bytes(), b"fibonacci");
        assert_eq!(buf.as_bytes_with_nul(), b"fibonacci\0");
    }

    #[test]
    fn with_capacity_picks_storage() {
        assert!(SboBuffer::with_capacity(INLINE_CAPACITY).unwrap().is_inline());
        let heap = SboBuffer::with_capacity(100).unwrap();
        assert!(!heap.is_inline());
        assert!(heap.capacity() >= 100);
        assert_eq!((heap.capacity() + 1) % BLOCK_ALIGNMENT, 0);
    }

    #[test]
    fn assign_inline_into_inline() {
        let from = SboBuffer::from_slice(b"55").unwrap();
        let mut to = SboBuffer::from_slice(b"123456").unwrap();
        to.assign(&from).unwrap();
        assert_eq!(to, from);
        assert_eq!(to.as_bytes_with_nul(), b"55\0");
        assert!(to.is_inline());
    }

    #[test]
    fn assign_heap_into_inline_allocates() {
        let from = filled(60);
        let mut to = SboBuffer::new();
        to.assign(&from).unwrap();
        assert!(!to.is_inline());
        assert_eq!(to.capacity(), from.capacity());
        assert_eq!(to.as_bytes(), from.as_bytes());
    }

    #[test]
    fn assign_reuses_large_enough_block() {
        let mut to = filled(100);
        let capacity = to.capacity();
        stats::reset();

        to.assign(&filled(30)).unwrap();
        assert_eq!(to.len(), 30);
        assert_eq!(to.capacity(), capacity);
        assert_eq!(stats::snapshot().heap_blocks, 1, "only the source was allocated");

        // Short contents keep the heap block: no shrink back inline.
        to.assign(&SboBuffer::from_slice(b"1").unwrap()).unwrap();
        assert!(!to.is_inline());
        assert_eq!(to.as_bytes_with_nul(), b"1\0");
    }

    #[test]
    fn assign_grows_small_block() {
        let mut to = filled(30);
        let from = filled(200);
        to.assign(&from).unwrap();
        assert_eq!(to.as_bytes(), from.as_bytes());
        assert!(to.capacity() >= 200);
    }

    #[test]
    fn release_returns_to_inline() {
        let mut buf = filled(50);
        buf.release();
        assert!(buf.is_inline());
        assert!(buf.is_empty());
        buf.push(b'1').unwrap();
        assert_eq!(buf.as_bytes(), b"1");
    }

    #[test]
    fn try_clone_is_deep() {
        let original = filled(40);
        let mut copy = original.try_clone().unwrap();
        copy.as_bytes_mut()[0] = b'x';
        assert_eq!(original.as_bytes()[0], b'0');
        assert_eq!(copy.len(), original.len());
    }

    #[test]
    fn extend_over_budget_leaves_buffer_untouched() {
        let mut buf = filled(INLINE_CAPACITY);
        let _guard = limit_block_size(Some(32));
        let err = buf.extend_capacity().unwrap_err();
        assert_eq!(
            err,
            AllocError::BudgetExceeded {
                requested: 48,
                limit: 32
            }
        );
        assert!(buf.is_inline());
        assert_eq!(buf.len(), INLINE_CAPACITY);
        assert!(buf.push(b'x').is_err());
        assert_eq!(buf.len(), INLINE_CAPACITY);
    }

    #[test]
    fn assign_over_budget_leaves_target_untouched() {
        let from = filled(100);
        let mut to = SboBuffer::from_slice(b"42").unwrap();
        let _guard = limit_block_size(Some(64));
        assert!(to.assign(&from).is_err());
        assert_eq!(to.as_bytes(), b"42");
    }

    #[test]
    #[should_panic(expected = "exceeds capacity")]
    fn set_len_beyond_capacity_panics() {
        let mut buf = SboBuffer::new();
        buf.set_len(INLINE_CAPACITY + 1);
    }

    #[test]
    fn set_len_writes_terminator() {
        let mut buf = SboBuffer::from_slice(b"abcdef").unwrap();
        buf.set_len(3);
        assert_eq!(buf.as_bytes_with_nul(), b"abc\0");
        // Slots past the terminator are untouched and become visible again.
        buf.set_len(6);
        assert_eq!(&buf.as_bytes()[4..], b"ef");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(u8),
        Extend,
        Assign(Vec<u8>),
        Release,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => any::<u8>().prop_map(Op::Push),
            1 => Just(Op::Extend),
            2 => proptest::collection::vec(any::<u8>(), 0..120).prop_map(Op::Assign),
            1 => Just(Op::Release),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Random operation sequences keep contents, terminator and capacity
        /// grid intact, and heap storage is only left through `release`.
        #[test]
        fn operations_keep_buffer_invariants(ops in proptest::collection::vec(op(), 1..80)) {
            let mut buf = SboBuffer::new();
            let mut model: Vec<u8> = Vec::new();

            for op in ops {
                let was_heap = !buf.is_inline();
                let old_capacity = buf.capacity();
                let released = matches!(op, Op::Release);
                match op {
                    Op::Push(byte) => {
                        buf.push(byte).unwrap();
                        model.push(byte);
                    }
                    Op::Extend if old_capacity > 1 << 16 => {}
                    Op::Extend => {
                        let new_capacity = buf.extend_capacity().unwrap();
                        prop_assert_eq!(
                            new_capacity,
                            (old_capacity * 2).next_multiple_of(BLOCK_ALIGNMENT) - 1
                        );
                        prop_assert_eq!(buf.capacity(), new_capacity);
                    }
                    Op::Assign(bytes) => {
                        let from = SboBuffer::from_slice(&bytes).unwrap();
                        buf.assign(&from).unwrap();
                        if bytes.len() <= old_capacity {
                            prop_assert_eq!(buf.capacity(), old_capacity);
                        }
                        model = bytes;
                    }
                    Op::Release => {
                        buf.release();
                        model.clear();
                        prop_assert!(buf.is_inline());
                    }
                }

                prop_assert_eq!(buf.as_bytes(), model.as_slice());
                prop_assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));
                prop_assert!(buf.len() <= buf.capacity());
                if buf.is_inline() {
                    prop_assert_eq!(buf.capacity(), INLINE_CAPACITY);
                } else {
                    prop_assert_eq!((buf.capacity() + 1) % BLOCK_ALIGNMENT, 0);
                }
                if was_heap && !released {
                    prop_assert!(!buf.is_inline());
                }
            }
        }
    }
}
