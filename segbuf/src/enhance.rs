//! Materialization on demand (Enhance) and byte transfer across parts.
//!
//! Every read or write first enhances the range under its cursor so that
//! contiguous, filled parts back it, then copies bytes part by part.

use crate::block::Block;
use crate::buffer::Buffer;
use crate::error::{BufferError, Capability, Result};
use crate::options::FlushLevel;
use crate::part::Part;
use crate::part_list::Location;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_len(n: i64) -> usize {
    debug_assert!(n >= 0);
    n as usize
}

impl Buffer {
    /// Ensures `count` bytes starting at the read (or write) cursor are backed
    /// by materialized parts, creating and filling parts as needed.
    ///
    /// Caches the part containing the cursor so the following transfer does
    /// not have to locate it again.
    pub(crate) fn enhance(&mut self, count: usize, for_writing: bool) -> Result<()> {
        let cursor = if for_writing { self.write } else { self.read };
        let start = cursor.pos;
        let end = self.checked_range(start, count)?;

        let mut storage = self.storage.borrow_mut();
        let storage = &mut *storage;
        let mut hint = cursor.part;
        let mut first_part = None;
        let mut cur = start;
        while cur < end {
            match storage.parts.ensure_valid(&mut hint, cur) {
                Location::Inside(index) => {
                    #[allow(clippy::expect_used)]
                    let part = storage
                        .parts
                        .get_mut(index)
                        .expect("Located part exists");
                    let covered = end.min(part.end());
                    part.advance_filled_to(covered);
                    cur = covered;
                    first_part.get_or_insert(index);
                    hint = Some(index + 1);
                }
                Location::Gap(index) => {
                    let next_start = storage.parts.start_at(index);
                    let capacity = self.new_part_capacity(cur, end - cur, next_start);
                    let wanted = as_len(end - cur).min(capacity);
                    let block = if storage.source.is_none() {
                        Block::allocate(capacity, wanted)
                    } else {
                        let mut block = Block::allocate(capacity, 0);
                        let supplied = storage.source.fill(cur, block.bytes_from_mut(0))?;
                        tracing::trace!(offset = cur, supplied, capacity, "part filled from source");
                        if supplied < wanted {
                            tracing::warn!(
                                offset = cur,
                                supplied,
                                wanted,
                                "source ended early, remainder reads as zero"
                            );
                        }
                        if self.options.secure {
                            block.zero(supplied, capacity);
                        }
                        block.extend_used_to(capacity);
                        block
                    };
                    tracing::debug!(
                        start = cur,
                        capacity,
                        next = ?next_start,
                        "materialized new part"
                    );
                    storage.parts.insert(index, Part::new(cur, block));
                    first_part.get_or_insert(index);
                    cur = cur.saturating_add(i64::try_from(capacity).unwrap_or(i64::MAX));
                    hint = Some(index + 1);
                }
            }
        }

        if end > self.max_pos {
            self.max_pos = end;
        }
        if for_writing {
            self.write.part = first_part;
        } else {
            self.read.part = first_part;
        }
        Ok(())
    }

    /// Validates `count` bytes from `start` against the buffer bounds and
    /// returns the exclusive end. Touches nothing.
    pub(crate) fn checked_range(&self, start: i64, count: usize) -> Result<i64> {
        if count == 0 {
            return Err(BufferError::InvalidCount { count: 0 });
        }
        let end = self.checked_end(start, count)?;
        if start < self.min_pos {
            return Err(self.out_of_range(start));
        }
        if end > self.max_pos && !self.caps.can_extend {
            return Err(self.out_of_range(end));
        }
        Ok(end)
    }

    /// Capacity for a part created at `at` when `wanted` bytes are needed.
    ///
    /// Rounds up to the part size. If the gap to the next part would leave a
    /// sliver smaller than one part size, the new part fills the gap exactly.
    /// A non-growing buffer never allocates past its end.
    fn new_part_capacity(&self, at: i64, wanted: i64, next_start: Option<i64>) -> usize {
        let part_size = i64::try_from(self.options.part_size).unwrap_or(i64::MAX);
        let proposed = wanted
            .div_euclid(part_size)
            .saturating_add(i64::from(wanted % part_size != 0))
            .saturating_mul(part_size);
        let mut capacity = match next_start {
            Some(next) if next - at < proposed.saturating_add(part_size) => next - at,
            _ => proposed,
        };
        if !self.caps.can_extend {
            capacity = capacity.min(self.max_pos - at);
        }
        as_len(capacity)
    }

    /// Copies bytes at the read cursor into `dst` and advances the cursor.
    ///
    /// The range must have been enhanced.
    pub(crate) fn retrieve(&mut self, dst: &mut [u8]) {
        let storage = self.storage.borrow();
        let mut done = 0;
        while done < dst.len() {
            let index = match storage.parts.ensure_valid(&mut self.read.part, self.read.pos) {
                Location::Inside(index) => index,
                Location::Gap(_) => panic!(
                    "Part list corrupted: no part at enhanced read position {}",
                    self.read.pos
                ),
            };
            #[allow(clippy::expect_used)]
            let part = storage.parts.get(index).expect("Located part exists");
            let available = as_len(part.end() - self.read.pos);
            let n = available.min(dst.len() - done);
            dst[done..done + n].copy_from_slice(&part.data(self.read.pos)[..n]);
            done += n;
            self.read.pos += i64::try_from(n).unwrap_or(i64::MAX);
            if n == available {
                self.read.part = Some(index + 1);
            }
        }
    }

    /// Copies `src` to the write cursor and advances the cursor.
    ///
    /// The range must have been enhanced.
    pub(crate) fn store(&mut self, src: &[u8]) {
        let mut storage = self.storage.borrow_mut();
        let mut done = 0;
        while done < src.len() {
            let index = match storage.parts.ensure_valid(&mut self.write.part, self.write.pos) {
                Location::Inside(index) => index,
                Location::Gap(_) => panic!(
                    "Part list corrupted: no part at enhanced write position {}",
                    self.write.pos
                ),
            };
            #[allow(clippy::expect_used)]
            let part = storage.parts.get_mut(index).expect("Located part exists");
            let available = as_len(part.end() - self.write.pos);
            let n = available.min(src.len() - done);
            part.data_mut(self.write.pos)[..n].copy_from_slice(&src[done..done + n]);
            done += n;
            self.write.pos += i64::try_from(n).unwrap_or(i64::MAX);
            if n == available {
                self.write.part = Some(index + 1);
            }
        }
    }

    pub(crate) fn check_readable(&self, operation: &'static str) -> Result<()> {
        self.require(self.caps.can_input, operation, Capability::Input)?;
        self.require_read_aligned()
    }

    pub(crate) fn check_writable(&self, operation: &'static str) -> Result<()> {
        self.require(self.caps.can_output, operation, Capability::Output)?;
        self.require_write_aligned()
    }

    /// Reads `dst.len()` raw bytes, without byte order conversion.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCapability` if the buffer cannot be read
    /// - `BufferError::BitOffsetMisaligned` if the read cursor is mid-byte
    /// - `BufferError::InvalidCount` for an empty `dst`
    /// - `BufferError::OutOfRange` past the end of a non-growing buffer
    /// - source errors while materializing
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        self.check_readable("read_bytes")?;
        self.enhance(dst.len(), false)?;
        self.retrieve(dst);
        Ok(())
    }

    /// Reads `count` raw bytes into a new vector.
    ///
    /// # Errors
    ///
    /// See `read_bytes`.
    pub fn read_vec(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; count];
        self.read_bytes(&mut bytes)?;
        Ok(bytes)
    }

    /// Writes raw bytes, without byte order conversion.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCapability` if the buffer cannot be written
    /// - `BufferError::BitOffsetMisaligned` if the write cursor is mid-byte
    /// - `BufferError::InvalidCount` for an empty `src`
    /// - `BufferError::OutOfRange` past the end of a non-growing buffer
    /// - sink errors on auto-flush
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.check_writable("write_bytes")?;
        self.write_raw(src)?;
        self.auto_flush(FlushLevel::MultiByte)
    }

    /// Enhance and store without capability checks or flushing.
    pub(crate) fn write_raw(&mut self, src: &[u8]) -> Result<()> {
        self.enhance(src.len(), true)?;
        self.store(src);
        Ok(())
    }

    /// Skips `count` bytes on the read side without copying them out.
    ///
    /// # Errors
    ///
    /// See `seek_read_relative`.
    pub fn skip_bytes(&mut self, count: usize) -> Result<()> {
        self.seek_read_relative(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Buffer, BufferOptions};

    fn small() -> BufferOptions {
        BufferOptions::new().with_part_size(16)
    }

    #[test]
    fn test_capacity_rounds_up() {
        let buffer = Buffer::new(small()).unwrap();
        assert_eq!(buffer.new_part_capacity(0, 1, None), 16);
        assert_eq!(buffer.new_part_capacity(0, 16, None), 16);
        assert_eq!(buffer.new_part_capacity(0, 17, None), 32);
    }

    #[test]
    fn test_capacity_fills_small_gap() {
        let buffer = Buffer::new(small()).unwrap();
        // 40-byte gap, 16 proposed: 40 >= 16 + 16, keep proposed
        assert_eq!(buffer.new_part_capacity(0, 5, Some(40)), 16);
        // 20-byte gap would leave a 4-byte sliver
        assert_eq!(buffer.new_part_capacity(0, 5, Some(20)), 20);
        // gap smaller than wanted
        assert_eq!(buffer.new_part_capacity(0, 30, Some(10)), 10);
    }

    #[test]
    fn test_capacity_clamped_to_end() {
        let buffer = Buffer::from_bytes(vec![0u8; 10], small()).unwrap();
        assert_eq!(buffer.new_part_capacity(4, 2, None), 6);
    }

    #[test]
    fn test_enhance_caches_cursor() {
        let mut buffer = Buffer::new(small()).unwrap();
        buffer.write_bytes(&[1u8; 40]).unwrap();
        buffer.seek_read_absolute(20).unwrap();
        buffer.enhance(4, false).unwrap();
        assert_eq!(buffer.read.part, Some(0));
    }

    #[test]
    fn test_checked_range_bounds() {
        let buffer = Buffer::from_bytes(vec![0u8; 10], small()).unwrap();
        assert_eq!(buffer.checked_range(4, 6).unwrap(), 10);
        assert!(buffer.checked_range(4, 7).is_err());
        assert!(buffer.checked_range(-1, 1).is_err());
        assert!(buffer.checked_range(0, 0).is_err());
    }

    #[test]
    fn test_enhance_zero_count() {
        let mut buffer = Buffer::new(small()).unwrap();
        assert!(buffer.enhance(0, true).is_err());
    }
}
