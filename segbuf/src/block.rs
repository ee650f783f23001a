/// A capacity-bounded byte allocation with a tracked "used" prefix.
///
/// Storage is zero-initialized on allocation, so bytes beyond `used` are
/// never uninitialized memory; they are simply not yet materialized.
#[derive(Debug)]
pub struct Block {
    storage: Box<[u8]>,
    used: usize,
}

impl Block {
    /// Allocates `capacity` zeroed bytes with `used` bytes already counted as filled.
    ///
    /// # Panics
    ///
    /// If `used > capacity`.
    #[must_use]
    pub fn allocate(capacity: usize, used: usize) -> Self {
        assert!(
            used <= capacity,
            "Block used length {used} exceeds capacity {capacity}"
        );
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            used,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Grows the used prefix to `n` bytes.
    ///
    /// # Panics
    ///
    /// If `n` is below the current used length or above the capacity.
    pub fn extend_used_to(&mut self, n: usize) {
        assert!(
            self.used <= n && n <= self.capacity(),
            "Block extension to {n} outside [{}, {}]",
            self.used,
            self.capacity()
        );
        self.used = n;
    }

    /// Bytes from `local_offset` to the end of the capacity.
    #[must_use]
    pub fn bytes_from(&self, local_offset: usize) -> &[u8] {
        &self.storage[local_offset..]
    }

    pub fn bytes_from_mut(&mut self, local_offset: usize) -> &mut [u8] {
        &mut self.storage[local_offset..]
    }

    /// Zero the range `[from, to)` of the storage.
    pub fn zero(&mut self, from: usize, to: usize) {
        self.storage[from..to].fill(0);
    }
}
