use thiserror::Error;

/// Capability a buffer operation requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Input,
    Output,
    Seek,
    Extend,
    /// The buffer owns its storage (not an extraction)
    Owner,
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Capability::Input => "input",
            Capability::Output => "output",
            Capability::Seek => "seek",
            Capability::Extend => "extend",
            Capability::Owner => "storage ownership",
        };
        f.write_str(name)
    }
}

/// Error types for `Buffer` operations
#[derive(Error, Debug)]
pub enum BufferError {
    /// The buffer lacks the capability the operation needs
    #[error("Invalid capability: `{operation}` requires {capability}")]
    InvalidCapability {
        /// Name of the rejected operation
        operation: &'static str,
        /// Capability the buffer is missing
        capability: Capability,
    },
    /// A position or range falls outside the buffer's logical window
    #[error("Out of range: position {position} is outside [{min}, {max}]")]
    OutOfRange {
        /// Offending absolute position
        position: i64,
        /// Logical start of the buffer
        min: i64,
        /// Logical end of the buffer
        max: i64,
    },
    /// Seek requested on a buffer that cannot seek
    #[error("Buffer is not seekable")]
    NotSeekable,
    /// A byte-aligned operation was requested while a bit cursor is mid-byte
    #[error("Bit offset misaligned: cursor is at bit {bit}, expected a byte boundary")]
    BitOffsetMisaligned {
        /// Current sub-byte offset
        bit: u8,
    },
    /// Byte or bit count is zero, negative or too large
    #[error("Invalid count: {count}")]
    InvalidCount {
        /// Count that was rejected
        count: i64,
    },
    /// The operation needs a known maximum position
    #[error("Maximum position is not known")]
    MaxPosUnknown,
    /// The maximum position has already been fixed or computed
    #[error("Maximum position is already fixed")]
    MaxPosAlreadyFixed,
    /// Secure mode found set bits in discarded padding
    #[error("Non-zero padding bits: {bits:#010b}")]
    NonZeroPadding {
        /// Discarded bits, aligned to bit 0
        bits: u8,
    },
    /// Invalid option passed at construction time
    #[error("Invalid configuration: {parameter} = {value}")]
    InvalidConfiguration {
        /// Name of the parameter
        parameter: &'static str,
        /// Provided value
        value: usize,
    },
    /// A sequential source was asked for bytes it already delivered elsewhere
    #[error("Source cannot rewind: requested offset {requested}, source is at {position}")]
    SourceRewind {
        /// Offset the buffer needed
        requested: i64,
        /// Current position of the source
        position: i64,
    },
    /// File or sink I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Stream source failed
    #[error("Stream error: {0:?}")]
    Stream(embedded_io::ErrorKind),
}

pub type Result<T> = core::result::Result<T, BufferError>;
