use crate::block::Block;

/// A block placed at an absolute offset of the buffer's coordinate space.
#[derive(Debug)]
pub struct Part {
    start: i64,
    block: Block,
}

fn as_offset(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn as_local(offset: i64) -> usize {
    debug_assert!(offset >= 0);
    offset as usize
}

impl Part {
    #[must_use]
    pub fn new(start: i64, block: Block) -> Self {
        Self { start, block }
    }

    #[must_use]
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Exclusive end of the capacity, saturating at `i64::MAX`.
    #[must_use]
    pub fn end(&self) -> i64 {
        self.start.saturating_add(as_offset(self.block.capacity()))
    }

    /// Last addressable offset.
    #[must_use]
    pub fn max_index(&self) -> i64 {
        self.end() - 1
    }

    /// Exclusive end of the materialized prefix.
    #[must_use]
    pub fn filled_end(&self) -> i64 {
        self.start.saturating_add(as_offset(self.block.used()))
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    #[must_use]
    pub fn used(&self) -> usize {
        self.block.used()
    }

    #[must_use]
    pub fn contains(&self, offset: i64) -> bool {
        self.start <= offset && offset < self.end()
    }

    /// Grows the materialized prefix so that it reaches `target_end`.
    ///
    /// Does nothing if the prefix already covers it.
    ///
    /// # Panics
    ///
    /// If `target_end` lies beyond the capacity.
    pub fn advance_filled_to(&mut self, target_end: i64) {
        assert!(
            target_end <= self.end(),
            "Part [{}, {}) cannot be filled to {target_end}",
            self.start,
            self.end()
        );
        if target_end > self.filled_end() {
            self.block.extend_used_to(as_local(target_end - self.start));
        }
    }

    /// Storage starting at absolute offset `abs`.
    #[must_use]
    pub fn data(&self, abs: i64) -> &[u8] {
        self.block.bytes_from(as_local(abs - self.start))
    }

    pub fn data_mut(&mut self, abs: i64) -> &mut [u8] {
        self.block.bytes_from_mut(as_local(abs - self.start))
    }

    /// Materialized bytes from `abs` up to the filled end.
    #[must_use]
    pub fn filled_data(&self, abs: i64) -> &[u8] {
        let local = as_local(abs - self.start);
        &self.block.bytes_from(local)[..self.block.used().saturating_sub(local)]
    }
}
