//! The `Buffer` type: lifecycle, capabilities, positions and range management.
//!
//! Byte transfer lives in `enhance`, value and bit I/O in `typed`, `bits` and
//! `text`, buffer-to-buffer operations in `compound`.

use std::cell::RefCell;
use std::fs::File;
use std::path::Path;
use std::rc::Rc;

use crate::endian::Converter;
use crate::error::{BufferError, Capability, Result};
use crate::options::{BufferOptions, FlushLevel};
use crate::part_list::PartList;
use crate::source::{Sink, Source, StreamRead};

/// Parts and source shared by every buffer aliasing the same storage.
///
/// Freed when the last referencing buffer goes away.
#[derive(Debug)]
pub(crate) struct Storage {
    pub(crate) parts: PartList,
    pub(crate) source: Source,
}

impl Storage {
    fn shared(source: Source) -> Rc<RefCell<Storage>> {
        Rc::new(RefCell::new(Storage {
            parts: PartList::new(),
            source,
        }))
    }
}

/// What a buffer may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    pub can_input: bool,
    pub can_output: bool,
    pub can_seek: bool,
    /// The logical end grows with writes and reads past it
    pub can_extend: bool,
    pub max_pos_known: bool,
}

/// Read or write cursor with a cached part hint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub(crate) pos: i64,
    pub(crate) bit: u8,
    pub(crate) part: Option<usize>,
}

impl Cursor {
    fn at(pos: i64) -> Self {
        Self {
            pos,
            bit: 0,
            part: None,
        }
    }
}

/// Sparse, lazily materialized, randomly seekable byte buffer.
///
/// Bytes live in parts that are created on demand: when a read or write
/// touches a range nothing backs yet, a new part is allocated and, for
/// file, byte or stream backed buffers, filled from the source.
pub struct Buffer {
    pub(crate) storage: Rc<RefCell<Storage>>,
    pub(crate) sink: Option<Sink>,
    pub(crate) options: BufferOptions,
    pub(crate) converter: Converter,
    pub(crate) caps: Capabilities,
    pub(crate) is_extraction: bool,
    pub(crate) min_pos: i64,
    /// Exclusive logical end; `i64::MAX` while unknown and not extendable
    pub(crate) max_pos: i64,
    pub(crate) read: Cursor,
    pub(crate) write: Cursor,
    pub(crate) flushed_pos: i64,
}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Buffer {{ caps: {:?}, min_pos: {}, max_pos: {}, read: {:?}, write: {:?}, extraction: {}, parts: {} }}",
            self.caps,
            self.min_pos,
            self.max_pos,
            self.read,
            self.write,
            self.is_extraction,
            self.part_count()
        )
    }
}

impl Buffer {
    fn with_storage(
        storage: Rc<RefCell<Storage>>,
        options: BufferOptions,
        caps: Capabilities,
        max_pos: i64,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            storage,
            sink: None,
            converter: Converter::to_native(options.endianness),
            options,
            caps,
            is_extraction: false,
            min_pos: 0,
            max_pos,
            read: Cursor::default(),
            write: Cursor::default(),
            flushed_pos: 0,
        })
    }

    /// Creates a free-standing accumulator: readable, writable, growing.
    ///
    /// # Errors
    ///
    /// `BufferError::InvalidConfiguration` for invalid options.
    pub fn new(options: BufferOptions) -> Result<Self> {
        let caps = Capabilities {
            can_input: true,
            can_output: true,
            can_seek: true,
            can_extend: true,
            max_pos_known: false,
        };
        Self::with_storage(Storage::shared(Source::None), options, caps, 0)
    }

    /// Creates an accumulator whose bytes are flushed into `writer`.
    ///
    /// # Errors
    ///
    /// `BufferError::InvalidConfiguration` for invalid options.
    pub fn with_sink(writer: impl std::io::Write + 'static, options: BufferOptions) -> Result<Self> {
        let mut buffer = Self::new(options)?;
        buffer.sink = Some(Sink::new(writer));
        Ok(buffer)
    }

    /// Creates (truncating) the file at `path` and accumulates into it.
    ///
    /// # Errors
    ///
    /// - `BufferError::Io` if the file cannot be created
    /// - `BufferError::InvalidConfiguration` for invalid options
    pub fn create_file(path: impl AsRef<Path>, options: BufferOptions) -> Result<Self> {
        let file = File::create(path)?;
        Self::with_sink(file, options)
    }

    /// Reads from a byte array; the size is known up front.
    ///
    /// # Errors
    ///
    /// `BufferError::InvalidConfiguration` for invalid options.
    pub fn from_bytes(bytes: impl Into<Rc<[u8]>>, options: BufferOptions) -> Result<Self> {
        let bytes: Rc<[u8]> = bytes.into();
        let len = i64::try_from(bytes.len()).unwrap_or(i64::MAX);
        let caps = Capabilities {
            can_input: true,
            can_output: false,
            can_seek: true,
            can_extend: false,
            max_pos_known: true,
        };
        Self::with_storage(Storage::shared(Source::Bytes(bytes)), options, caps, len)
    }

    /// Reads from the file at `path`; the size stays unknown until
    /// `compute_max_pos` is called.
    ///
    /// # Errors
    ///
    /// - `BufferError::Io` if the file cannot be opened
    /// - `BufferError::InvalidConfiguration` for invalid options
    pub fn from_file(path: impl AsRef<Path>, options: BufferOptions) -> Result<Self> {
        let file = File::open(path)?;
        Self::with_storage(
            Storage::shared(Source::File(file)),
            options,
            Self::unbounded_input(),
            i64::MAX,
        )
    }

    /// Reads from a sequential stream. Bytes already consumed from the stream
    /// can be revisited only while their parts are still materialized.
    ///
    /// # Errors
    ///
    /// `BufferError::InvalidConfiguration` for invalid options.
    pub fn from_stream(reader: impl StreamRead + 'static, options: BufferOptions) -> Result<Self> {
        Self::with_storage(
            Storage::shared(Source::stream(reader)),
            options,
            Self::unbounded_input(),
            i64::MAX,
        )
    }

    fn unbounded_input() -> Capabilities {
        Capabilities {
            can_input: true,
            can_output: false,
            can_seek: true,
            can_extend: false,
            max_pos_known: false,
        }
    }

    /// Creates a read-only view of the next `size` bytes of `src`.
    ///
    /// The view shares `src`'s parts and source. `src`'s read cursor moves
    /// past the extracted range.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCapability` if `src` cannot be read
    /// - `BufferError::BitOffsetMisaligned` if `src` is mid-byte
    /// - `BufferError::OutOfRange` if the range passes `src`'s end
    pub fn extract(src: &mut Buffer, size: usize) -> Result<Buffer> {
        src.require(src.caps.can_input, "extract", Capability::Input)?;
        src.require_read_aligned()?;
        let start = src.read.pos;
        let end = src.checked_end(start, size)?;
        if !src.caps.can_extend && end > src.max_pos {
            return Err(src.out_of_range(end));
        }

        let buffer = Buffer {
            storage: Rc::clone(&src.storage),
            sink: None,
            options: src.options.clone(),
            converter: src.converter,
            caps: Capabilities {
                can_input: true,
                can_output: false,
                can_seek: src.caps.can_seek,
                can_extend: false,
                max_pos_known: true,
            },
            is_extraction: true,
            min_pos: start,
            max_pos: end,
            read: Cursor::at(start),
            write: Cursor::at(start),
            flushed_pos: start,
        };
        src.read.pos = end;
        src.read.part = None;
        tracing::trace!(start, end, "extraction created");
        Ok(buffer)
    }

    //
    // Capability queries
    //

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    #[must_use]
    pub fn can_input(&self) -> bool {
        self.caps.can_input
    }

    #[must_use]
    pub fn can_output(&self) -> bool {
        self.caps.can_output
    }

    #[must_use]
    pub fn can_seek(&self) -> bool {
        self.caps.can_seek
    }

    #[must_use]
    pub fn can_extend(&self) -> bool {
        self.caps.can_extend
    }

    #[must_use]
    pub fn has_known_max_pos(&self) -> bool {
        self.caps.max_pos_known
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.options.secure
    }

    #[must_use]
    pub fn is_extraction(&self) -> bool {
        self.is_extraction
    }

    #[must_use]
    pub fn options(&self) -> &BufferOptions {
        &self.options
    }

    pub(crate) fn require(
        &self,
        present: bool,
        operation: &'static str,
        capability: Capability,
    ) -> Result<()> {
        if present {
            Ok(())
        } else {
            Err(BufferError::InvalidCapability {
                operation,
                capability,
            })
        }
    }

    pub(crate) fn require_read_aligned(&self) -> Result<()> {
        if self.read.bit == 0 {
            Ok(())
        } else {
            Err(BufferError::BitOffsetMisaligned { bit: self.read.bit })
        }
    }

    pub(crate) fn require_write_aligned(&self) -> Result<()> {
        if self.write.bit == 0 {
            Ok(())
        } else {
            Err(BufferError::BitOffsetMisaligned {
                bit: self.write.bit,
            })
        }
    }

    pub(crate) fn out_of_range(&self, position: i64) -> BufferError {
        BufferError::OutOfRange {
            position,
            min: self.min_pos,
            max: self.max_pos,
        }
    }

    pub(crate) fn checked_end(&self, start: i64, count: usize) -> Result<i64> {
        i64::try_from(count)
            .ok()
            .and_then(|count| start.checked_add(count))
            .ok_or_else(|| self.out_of_range(i64::MAX))
    }

    //
    // Positions
    //

    #[must_use]
    pub fn read_pos(&self) -> i64 {
        self.read.pos
    }

    #[must_use]
    pub fn write_pos(&self) -> i64 {
        self.write.pos
    }

    /// Sub-byte offset of the read cursor, 0..=7
    #[must_use]
    pub fn read_bit_offset(&self) -> u8 {
        self.read.bit
    }

    /// Sub-byte offset of the write cursor, 0..=7
    #[must_use]
    pub fn write_bit_offset(&self) -> u8 {
        self.write.bit
    }

    #[must_use]
    pub fn min_pos(&self) -> i64 {
        self.min_pos
    }

    /// Logical end, if known.
    #[must_use]
    pub fn max_pos(&self) -> Option<i64> {
        self.caps.max_pos_known.then_some(self.max_pos)
    }

    /// Current logical end of an extendable buffer, or the known end.
    pub(crate) fn readable_end(&self) -> Option<i64> {
        (self.caps.max_pos_known || self.caps.can_extend).then_some(self.max_pos)
    }

    /// # Errors
    ///
    /// `BufferError::MaxPosUnknown` unless the maximum position is known.
    pub fn size(&self) -> Result<i64> {
        self.max_pos()
            .map(|max| max - self.min_pos)
            .ok_or(BufferError::MaxPosUnknown)
    }

    /// Whether the read cursor reached the logical end.
    ///
    /// Buffers over a file with an uncomputed size compare against the file's
    /// current physical size.
    #[must_use]
    pub fn is_read_at_end(&self) -> bool {
        if let Some(end) = self.readable_end() {
            return self.read.pos >= end;
        }
        match self.storage.borrow().source.size() {
            Ok(Some(size)) => self.read.pos >= size,
            _ => false,
        }
    }

    //
    // Seeking
    //

    fn validate_seek(&self, target: i64, bit: u8) -> Result<()> {
        if !self.caps.can_seek {
            return Err(BufferError::NotSeekable);
        }
        if bit != 0 {
            return Err(BufferError::BitOffsetMisaligned { bit });
        }
        if target < self.min_pos {
            return Err(self.out_of_range(target));
        }
        if !self.caps.can_extend && target > self.max_pos {
            return Err(self.out_of_range(target));
        }
        Ok(())
    }

    /// Moves the read cursor to absolute position `pos`.
    ///
    /// # Errors
    ///
    /// - `BufferError::NotSeekable` if the buffer cannot seek
    /// - `BufferError::BitOffsetMisaligned` if the cursor is mid-byte
    /// - `BufferError::OutOfRange` if `pos` is outside the logical window
    pub fn seek_read_absolute(&mut self, pos: i64) -> Result<()> {
        self.validate_seek(pos, self.read.bit)?;
        self.read.pos = pos;
        Ok(())
    }

    /// Moves the read cursor to `offset` bytes after the logical start.
    ///
    /// # Errors
    ///
    /// See `seek_read_absolute`.
    pub fn seek_read_local(&mut self, offset: i64) -> Result<()> {
        self.seek_read_absolute(self.min_pos.saturating_add(offset))
    }

    /// Moves the read cursor by `delta` bytes.
    ///
    /// # Errors
    ///
    /// See `seek_read_absolute`.
    pub fn seek_read_relative(&mut self, delta: i64) -> Result<()> {
        self.seek_read_absolute(self.read.pos.saturating_add(delta))
    }

    /// Moves the write cursor to absolute position `pos`.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCapability` if the buffer cannot be written
    /// - otherwise see `seek_read_absolute`
    pub fn seek_write_absolute(&mut self, pos: i64) -> Result<()> {
        self.require(self.caps.can_output, "seek_write", Capability::Output)?;
        self.validate_seek(pos, self.write.bit)?;
        self.write.pos = pos;
        Ok(())
    }

    /// # Errors
    ///
    /// See `seek_write_absolute`.
    pub fn seek_write_local(&mut self, offset: i64) -> Result<()> {
        self.seek_write_absolute(self.min_pos.saturating_add(offset))
    }

    /// # Errors
    ///
    /// See `seek_write_absolute`.
    pub fn seek_write_relative(&mut self, delta: i64) -> Result<()> {
        self.seek_write_absolute(self.write.pos.saturating_add(delta))
    }

    //
    // Range management
    //

    /// Takes the logical end from the source's physical size.
    ///
    /// # Errors
    ///
    /// - `BufferError::MaxPosAlreadyFixed` if the end is already known
    /// - `BufferError::MaxPosUnknown` if the source has no size
    /// - `BufferError::Io` if querying the size fails
    pub fn compute_max_pos(&mut self) -> Result<i64> {
        if self.caps.max_pos_known {
            return Err(BufferError::MaxPosAlreadyFixed);
        }
        let size = self
            .storage
            .borrow()
            .source
            .size()?
            .ok_or(BufferError::MaxPosUnknown)?;
        self.max_pos = size;
        self.caps.max_pos_known = true;
        self.caps.can_extend = false;
        tracing::debug!(max_pos = size, "max position computed from source");
        Ok(size)
    }

    /// Freezes the current logical end of a growing buffer.
    ///
    /// # Errors
    ///
    /// - `BufferError::MaxPosAlreadyFixed` on a second call
    /// - `BufferError::InvalidCapability` if the buffer never grew on its own
    pub fn fix_max_pos(&mut self) -> Result<i64> {
        if self.caps.max_pos_known {
            return Err(BufferError::MaxPosAlreadyFixed);
        }
        self.require(self.caps.can_extend, "fix_max_pos", Capability::Extend)?;
        self.caps.max_pos_known = true;
        self.caps.can_extend = false;
        tracing::debug!(max_pos = self.max_pos, "max position fixed");
        Ok(self.max_pos)
    }

    //
    // Storage introspection
    //

    /// Number of parts in the shared storage.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.storage.borrow().parts.len()
    }

    /// `(start, end)` of every part, in order.
    #[must_use]
    pub fn part_ranges(&self) -> Vec<(i64, i64)> {
        self.storage
            .borrow()
            .parts
            .iter()
            .map(|part| (part.start(), part.end()))
            .collect()
    }

    /// Bytes materialized over all parts of the shared storage.
    #[must_use]
    pub fn materialized_bytes(&self) -> usize {
        self.storage.borrow().parts.materialized_bytes()
    }

    /// Bytes allocated over all parts of the shared storage.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.storage.borrow().parts.allocated_bytes()
    }

    /// Whether `self` and `other` alias the same storage.
    #[must_use]
    pub fn shares_storage_with(&self, other: &Buffer) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    /// Number of buffers referencing this buffer's storage.
    #[must_use]
    pub fn storage_refs(&self) -> usize {
        Rc::strong_count(&self.storage)
    }

    //
    // Lifecycle
    //

    /// Drops the materialized content and moves both cursors to the start.
    ///
    /// A growing buffer also forgets its logical end. Storage shared with
    /// other buffers is left to them; this buffer continues on fresh storage
    /// over the same source.
    ///
    /// # Errors
    ///
    /// - `BufferError::InvalidCapability` on an extraction, or on a stream
    ///   buffer whose storage is shared (a stream cannot be duplicated)
    /// - `BufferError::Io` if the file source cannot be duplicated
    pub fn clear(&mut self) -> Result<()> {
        self.require(!self.is_extraction, "clear", Capability::Owner)?;
        if Rc::strong_count(&self.storage) == 1 {
            self.storage.borrow_mut().parts.clear();
        } else {
            let source = self.storage.borrow().source.try_clone()?;
            let Some(source) = source else {
                return Err(BufferError::InvalidCapability {
                    operation: "clear",
                    capability: Capability::Owner,
                });
            };
            self.storage = Storage::shared(source);
        }
        self.read = Cursor::at(self.min_pos);
        self.write = Cursor::at(self.min_pos);
        self.flushed_pos = self.min_pos;
        if self.caps.can_extend {
            self.max_pos = self.min_pos;
        }
        tracing::debug!(min_pos = self.min_pos, "buffer cleared");
        Ok(())
    }

    /// Removes parts lying entirely before `pos`, releasing their memory.
    ///
    /// Returns the number of removed parts. Reading the range again
    /// re-materializes it from the source (zero for free-standing buffers).
    ///
    /// # Errors
    ///
    /// `BufferError::InvalidCapability` on an extraction.
    pub fn dismiss_before(&mut self, pos: i64) -> Result<usize> {
        self.require(!self.is_extraction, "dismiss_before", Capability::Owner)?;
        let removed = self.storage.borrow_mut().parts.remove_before(pos);
        self.read.part = None;
        self.write.part = None;
        tracing::debug!(pos, removed, "parts dismissed");
        Ok(removed)
    }

    /// Flushes pending bytes and releases the buffer.
    ///
    /// # Errors
    ///
    /// From flushing into the sink.
    pub fn release(mut self) -> Result<()> {
        self.flush()?;
        if let Some(sink) = self.sink.as_mut() {
            sink.flush()?;
        }
        self.sink = None;
        Ok(())
    }

    //
    // Flushing
    //

    /// Writes every byte between the last flushed position and the write
    /// cursor into the sink. Unwritten gaps are emitted as zeros.
    ///
    /// Does nothing for buffers without a sink.
    ///
    /// # Errors
    ///
    /// `BufferError::Io` from the sink.
    pub fn flush(&mut self) -> Result<()> {
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };
        let end = self.write.pos;
        let mut pos = self.flushed_pos;
        if pos >= end {
            return Ok(());
        }
        let storage = self.storage.borrow();
        while pos < end {
            let mut spans = storage.parts.spans(pos, end);
            for (_, bytes) in spans.by_ref() {
                sink.write_all(bytes)?;
            }
            let reached = spans.position();
            if reached >= end {
                pos = reached;
                break;
            }
            let gap_end = match storage.parts.locate(reached, None) {
                crate::part_list::Location::Gap(index) => {
                    storage.parts.start_at(index).unwrap_or(end).min(end)
                }
                crate::part_list::Location::Inside(index) => storage
                    .parts
                    .get(index)
                    .map_or(end, |part| part.end().min(end)),
            };
            write_zeros(sink, gap_end - reached)?;
            pos = gap_end;
        }
        tracing::debug!(from = self.flushed_pos, to = pos, "flushed");
        self.flushed_pos = pos;
        Ok(())
    }

    /// Flushes if the configured level covers `level`.
    pub(crate) fn auto_flush(&mut self, level: FlushLevel) -> Result<()> {
        let configured = self.options.flush_level;
        if self.sink.is_none() || configured == FlushLevel::None {
            return Ok(());
        }
        let part_pending = self.write.pos - self.flushed_pos
            >= i64::try_from(self.options.part_size).unwrap_or(i64::MAX);
        if configured >= level || part_pending {
            self.flush()?;
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn write_zeros(sink: &mut Sink, count: i64) -> Result<()> {
    let zeros = [0u8; 256];
    let mut left = count;
    while left > 0 {
        let n = left.min(256) as usize;
        sink.write_all(&zeros[..n])?;
        left -= n as i64;
    }
    Ok(())
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.sink.is_some() && self.flushed_pos < self.write.pos {
            tracing::warn!(
                pending = self.write.pos - self.flushed_pos,
                "buffer dropped with unflushed bytes"
            );
        }
    }
}
