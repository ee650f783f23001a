//! Operations moving bytes between buffers or within one buffer.

use std::rc::Rc;

use crate::buffer::Buffer;
use crate::checksum::Checksum;
use crate::error::{BufferError, Capability, Result};
use crate::options::FlushLevel;

impl Buffer {
    /// Copies the next `count` bytes of `src` (from its read cursor) to this
    /// buffer's write cursor.
    ///
    /// The bytes are taken straight from `src`'s parts, one contiguous span at
    /// a time; `src`'s read cursor advances by `count`. Both ranges are
    /// checked first, so a copy that does not fit leaves both buffers as
    /// they were.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCapability` if `self` cannot be written or
    ///   `src` cannot be read
    /// - `BufferError::BitOffsetMisaligned` if either cursor is mid-byte
    /// - `BufferError::OutOfRange` if either range passes its buffer's end
    pub fn write_buffer(&mut self, src: &mut Buffer, count: usize) -> Result<()> {
        self.check_writable("write_buffer")?;
        src.check_readable("write_buffer")?;
        self.checked_range(self.write.pos, count)?;
        src.checked_range(src.read.pos, count)?;
        if Rc::ptr_eq(&self.storage, &src.storage) {
            let bytes = src.read_vec(count)?;
            self.write_raw(&bytes)?;
            return self.auto_flush(FlushLevel::MultiByte);
        }

        src.enhance(count, false)?;
        let from = src.read.pos;
        let to = src.checked_end(from, count)?;
        {
            let src_storage = src.storage.borrow();
            for (_, bytes) in src_storage.parts.spans(from, to) {
                self.write_raw(bytes)?;
            }
        }
        src.read.pos = to;
        self.auto_flush(FlushLevel::MultiByte)
    }

    /// Copies `count` bytes from the read cursor to the write cursor of this
    /// buffer, LZ77 style: the ranges may overlap, in which case already
    /// copied bytes are repeated.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCapability` unless the buffer can be read and written
    /// - otherwise see `read_bytes` and `write_bytes`
    pub fn repeat_bytes(&mut self, count: usize) -> Result<()> {
        self.check_readable("repeat_bytes")?;
        self.check_writable("repeat_bytes")?;
        let distance = usize::try_from(self.write.pos - self.read.pos).unwrap_or(0);
        let chunk_size = if distance == 0 {
            self.options.part_size
        } else {
            distance.min(self.options.part_size)
        };
        let mut chunk = vec![0u8; chunk_size.min(count.max(1))];
        let mut left = count;
        while left > 0 {
            let n = left.min(chunk.len());
            let chunk = &mut chunk[..n];
            self.enhance(n, false)?;
            self.retrieve(chunk);
            self.write_raw(chunk)?;
            left -= n;
        }
        self.auto_flush(FlushLevel::MultiByte)
    }

    /// Feeds the whole logical range `[min_pos, end)` into `checksum`.
    ///
    /// The read cursor, its bit offset and its cached part are restored
    /// afterwards, whatever happens.
    ///
    /// # Errors
    ///
    /// - `BufferError::MaxPosUnknown` if the buffer has no known or growing end
    /// - source errors while materializing
    pub fn accumulate_to_checksum(&mut self, checksum: &mut Checksum) -> Result<()> {
        self.require(self.caps.can_input, "accumulate_to_checksum", Capability::Input)?;
        let end = self
            .readable_end()
            .ok_or(BufferError::MaxPosUnknown)?;
        let saved = self.read;
        let result = self.accumulate_range(checksum, self.min_pos, end);
        self.read = saved;
        result
    }

    fn accumulate_range(&mut self, checksum: &mut Checksum, from: i64, to: i64) -> Result<()> {
        if to <= from {
            return Ok(());
        }
        self.read.pos = from;
        self.read.bit = 0;
        self.read.part = None;
        let count = usize::try_from(to - from)
            .map_err(|_| BufferError::InvalidCount { count: to - from })?;
        self.enhance(count, false)?;
        let storage = self.storage.borrow();
        for (_, bytes) in storage.parts.spans(from, to) {
            checksum.accumulate(bytes);
        }
        Ok(())
    }
}
