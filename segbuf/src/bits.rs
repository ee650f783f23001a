//! Bit-level I/O on top of the byte cursors. Bits are taken LSB first.

use crate::buffer::Buffer;
use crate::error::{BufferError, Capability, Result};
use crate::options::FlushLevel;
use crate::part_list::Location;

/// Bytes touched by `count` bits starting at sub-byte offset `bit`.
fn bytes_spanned(bit: u8, count: u8) -> usize {
    (usize::from(bit) + usize::from(count)).div_ceil(8)
}

impl Buffer {
    /// Byte under the read cursor, materialized but not consumed.
    fn current_read_byte(&mut self) -> Result<u8> {
        self.enhance(1, false)?;
        let storage = self.storage.borrow();
        match storage.parts.ensure_valid(&mut self.read.part, self.read.pos) {
            Location::Inside(index) => Ok(storage
                .parts
                .get(index)
                .map_or(0, |part| part.data(self.read.pos)[0])),
            Location::Gap(_) => panic!(
                "Part list corrupted: no part at enhanced read position {}",
                self.read.pos
            ),
        }
    }

    /// Reads the next bit.
    ///
    /// The read cursor stays on the same byte until all eight bits are taken.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCapability` if the buffer cannot be read
    /// - `BufferError::OutOfRange` past the end of a non-growing buffer
    pub fn read_bit(&mut self) -> Result<bool> {
        self.require(self.caps.can_input, "read_bit", Capability::Input)?;
        let byte = self.current_read_byte()?;
        let bit = (byte >> self.read.bit) & 1;
        self.read.bit += 1;
        if self.read.bit == 8 {
            self.read.bit = 0;
            self.read.pos += 1;
        }
        Ok(bit == 1)
    }

    /// Reads `count` bits, the first read bit landing in bit 0 of the result.
    ///
    /// Every byte the bits touch is materialized first, so on error no bit
    /// has been consumed.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCount` unless `1 <= count <= 32`
    /// - otherwise see `read_bit`
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        if count == 0 || count > 32 {
            return Err(BufferError::InvalidCount {
                count: i64::from(count),
            });
        }
        self.require(self.caps.can_input, "read_bits", Capability::Input)?;
        self.enhance(bytes_spanned(self.read.bit, count), false)?;
        let mut value = 0u32;
        for i in 0..count {
            if self.read_bit()? {
                value |= 1 << i;
            }
        }
        Ok(value)
    }

    /// Skips the rest of a partially read byte.
    ///
    /// In secure mode the skipped bits must be zero.
    ///
    /// # Errors
    ///
    /// `BufferError::NonZeroPadding` in secure mode if a skipped bit is set.
    pub fn pad_read_bits(&mut self) -> Result<()> {
        if self.read.bit == 0 {
            return Ok(());
        }
        if self.options.secure {
            let rest = self.current_read_byte()? >> self.read.bit;
            if rest != 0 {
                return Err(BufferError::NonZeroPadding { bits: rest });
            }
        }
        self.read.bit = 0;
        self.read.pos += 1;
        Ok(())
    }

    /// Writes the next bit.
    ///
    /// Starting a fresh byte clears it, so unwritten bits of the byte are zero.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCapability` if the buffer cannot be written
    /// - `BufferError::OutOfRange` past the end of a non-growing buffer
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.require(self.caps.can_output, "write_bit", Capability::Output)?;
        self.enhance(1, true)?;
        {
            let mut storage = self.storage.borrow_mut();
            let index = match storage.parts.ensure_valid(&mut self.write.part, self.write.pos) {
                Location::Inside(index) => index,
                Location::Gap(_) => panic!(
                    "Part list corrupted: no part at enhanced write position {}",
                    self.write.pos
                ),
            };
            if let Some(part) = storage.parts.get_mut(index) {
                let byte = &mut part.data_mut(self.write.pos)[0];
                if self.write.bit == 0 {
                    *byte = 0;
                }
                if bit {
                    *byte |= 1 << self.write.bit;
                }
            }
        }
        self.write.bit += 1;
        if self.write.bit == 8 {
            self.write.bit = 0;
            self.write.pos += 1;
            self.auto_flush(FlushLevel::All)?;
        }
        Ok(())
    }

    /// Writes the low `count` bits of `value`, bit 0 first.
    ///
    /// The whole range is checked and materialized before the first bit, so
    /// a write past the end of a fixed buffer changes nothing.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCount` unless `1 <= count <= 32`
    /// - otherwise see `write_bit`
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        if count == 0 || count > 32 {
            return Err(BufferError::InvalidCount {
                count: i64::from(count),
            });
        }
        self.require(self.caps.can_output, "write_bits", Capability::Output)?;
        self.enhance(bytes_spanned(self.write.bit, count), true)?;
        for i in 0..count {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }

    /// Moves the write cursor to the next byte boundary; the rest of the
    /// current byte stays zero.
    ///
    /// # Errors
    ///
    /// Sink errors on auto-flush.
    pub fn pad_write_bits(&mut self) -> Result<()> {
        if self.write.bit == 0 {
            return Ok(());
        }
        self.write.bit = 0;
        self.write.pos += 1;
        self.auto_flush(FlushLevel::All)
    }
}
