use crate::endian::Endianness;
use crate::error::{BufferError, Result};

/// Part size used when none is configured
pub const DEFAULT_PART_SIZE: usize = 4096;

/// Smallest accepted part size; typed reads assume at least 16 bytes per part
pub const MIN_PART_SIZE: usize = 16;

/// How eagerly written bytes are pushed to a buffer's sink.
///
/// Every write carries a level; the buffer flushes after the write when its
/// configured level is at least that high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FlushLevel {
    /// Only explicit `flush` calls write to the sink
    #[default]
    None,
    /// Flush whenever a part's worth of bytes is pending
    Auto,
    /// Also flush after strings, tabs and newlines
    Text,
    /// Also flush after byte and array writes
    MultiByte,
    /// Flush after every write
    All,
}

/// Line terminator used by text writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    Lf,
    CrLf,
    Cr,
    #[default]
    Native,
}

impl Newline {
    #[must_use]
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Newline::Lf => b"\n",
            Newline::CrLf => b"\r\n",
            Newline::Cr => b"\r",
            Newline::Native if cfg!(windows) => b"\r\n",
            Newline::Native => b"\n",
        }
    }
}

/// Options for configuring a `Buffer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferOptions {
    /// Capacity granularity of newly materialized parts
    pub part_size: usize,
    /// Byte order of multi-byte values in the buffer
    pub endianness: Endianness,
    /// Verify that discarded padding bits are zero
    pub secure: bool,
    pub flush_level: FlushLevel,
    pub newline: Newline,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART_SIZE,
            endianness: Endianness::Native,
            secure: false,
            flush_level: FlushLevel::None,
            newline: Newline::Native,
        }
    }
}

impl BufferOptions {
    #[allow(clippy::must_use_candidate)]
    /// Creates new default options
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_part_size(mut self, part_size: usize) -> Self {
        self.part_size = part_size;
        self
    }

    #[must_use]
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_flush_level(mut self, flush_level: FlushLevel) -> Self {
        self.flush_level = flush_level;
        self
    }

    #[must_use]
    pub fn with_newline(mut self, newline: Newline) -> Self {
        self.newline = newline;
        self
    }

    /// # Errors
    ///
    /// `BufferError::InvalidConfiguration` if `part_size` is below `MIN_PART_SIZE`.
    pub fn validate(&self) -> Result<()> {
        if self.part_size < MIN_PART_SIZE {
            return Err(BufferError::InvalidConfiguration {
                parameter: "part_size",
                value: self.part_size,
            });
        }
        Ok(())
    }
}
