//! Symbol storage arena.
//!
//! A coder owns one contiguous byte arena addressed as `count` symbols of
//! `stride` bytes each, plus a per-symbol "set" flag. Callers hand buffers
//! in through `set_symbols_storage` / `set_symbol_storage`; the bytes are
//! copied into the arena so the coder never holds a borrow of caller memory.
//! All accessors are bounds checked by slicing; public coder methods
//! validate indices first and report [`Error::OutOfRange`](crate::Error).

/// Owned `(stride, count)` byte arena with per-symbol set tracking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolStorage {
    data: Vec<u8>,
    stride: usize,
    set: Vec<bool>,
    set_count: usize,
}

impl SymbolStorage {
    /// A zeroed arena of `count` symbols of `stride` bytes, none set.
    #[must_use]
    pub fn new(count: usize, stride: usize) -> Self {
        Self {
            data: vec![0; count * stride],
            stride,
            set: vec![false; count],
            set_count: 0,
        }
    }

    /// Number of symbol slots.
    #[must_use]
    pub fn count(&self) -> usize {
        self.set.len()
    }

    /// Bytes per symbol.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Number of slots marked set.
    #[must_use]
    pub const fn set_count(&self) -> usize {
        self.set_count
    }

    /// True if slot `index` is set.
    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        self.set.get(index).copied().unwrap_or(false)
    }

    /// Marks slot `index` set without touching its bytes.
    pub fn mark_set(&mut self, index: usize) {
        if !self.set[index] {
            self.set[index] = true;
            self.set_count += 1;
        }
    }

    /// Zeroes every byte and clears every flag.
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.set.fill(false);
        self.set_count = 0;
    }

    /// Copies `buf` over the arena from offset zero, zero-fills whatever
    /// `buf` does not cover, and marks every slot set.
    pub fn fill_from(&mut self, buf: &[u8]) {
        let n = buf.len().min(self.data.len());
        self.data[..n].copy_from_slice(&buf[..n]);
        self.data[n..].fill(0);
        self.set.fill(true);
        self.set_count = self.set.len();
    }

    /// Copies the first `stride` bytes of `buf` (zero padded if shorter)
    /// into slot `index` and marks it set.
    pub fn store(&mut self, index: usize, buf: &[u8]) {
        let slot = self.symbol_mut(index);
        let n = buf.len().min(slot.len());
        slot[..n].copy_from_slice(&buf[..n]);
        slot[n..].fill(0);
        self.mark_set(index);
    }

    /// Bytes of slot `index`.
    #[must_use]
    pub fn symbol(&self, index: usize) -> &[u8] {
        &self.data[index * self.stride..(index + 1) * self.stride]
    }

    /// Mutable bytes of slot `index`.
    pub fn symbol_mut(&mut self, index: usize) -> &mut [u8] {
        &mut self.data[index * self.stride..(index + 1) * self.stride]
    }

    /// Slot `dst` mutably together with slot `src` shared.
    ///
    /// # Panics
    ///
    /// Panics if `dst == src`.
    pub fn pair_mut(&mut self, dst: usize, src: usize) -> (&mut [u8], &[u8]) {
        split_pair(&mut self.data, self.stride, dst, src)
    }

    /// The whole arena.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Splits `data`, viewed as `stride`-byte rows, into row `dst` (mutable)
/// and row `src` (shared).
///
/// # Panics
///
/// Panics if `dst == src` or either row is out of bounds.
pub(crate) fn split_pair(data: &mut [u8], stride: usize, dst: usize, src: usize) -> (&mut [u8], &[u8]) {
    assert_ne!(dst, src, "row cannot be paired with itself");
    if dst < src {
        let (head, tail) = data.split_at_mut(src * stride);
        (&mut head[dst * stride..(dst + 1) * stride], &tail[..stride])
    } else {
        let (head, tail) = data.split_at_mut(dst * stride);
        (&mut tail[..stride], &head[src * stride..(src + 1) * stride])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_pads_and_counts() {
        let mut storage = SymbolStorage::new(3, 4);
        storage.store(1, &[9, 8]);
        assert_eq!(storage.symbol(1), &[9, 8, 0, 0]);
        assert!(storage.is_set(1));
        assert!(!storage.is_set(0));
        assert!(!storage.is_set(5));
        storage.store(1, &[1, 2, 3, 4, 5]);
        assert_eq!(storage.symbol(1), &[1, 2, 3, 4]);
        assert_eq!(storage.set_count(), 1);
    }

    #[test]
    fn fill_from_short_buffer() {
        let mut storage = SymbolStorage::new(2, 3);
        storage.store(0, &[7, 7, 7]);
        storage.fill_from(&[1, 2, 3, 4]);
        assert_eq!(storage.as_bytes(), &[1, 2, 3, 4, 0, 0]);
        assert_eq!(storage.set_count(), 2);
        storage.clear();
        assert_eq!(storage.set_count(), 0);
        assert_eq!(storage.as_bytes(), &[0; 6]);
    }

    #[test]
    fn pair_mut_both_orders() {
        let mut storage = SymbolStorage::new(3, 2);
        storage.fill_from(&[0, 1, 2, 3, 4, 5]);
        {
            let (dst, src) = storage.pair_mut(0, 2);
            assert_eq!(src, &[4, 5]);
            dst[0] = 40;
        }
        let (dst, src) = storage.pair_mut(2, 1);
        assert_eq!(src, &[2, 3]);
        assert_eq!(dst, &[4, 5]);
        assert_eq!(storage.symbol(0), &[40, 1]);
    }

    #[test]
    #[should_panic(expected = "paired with itself")]
    fn pair_mut_same_row_panics() {
        let mut storage = SymbolStorage::new(2, 2);
        let _ = storage.pair_mut(1, 1);
    }
}
