use segbuf::BufferError;
use thiserror::Error;

use crate::chunk::ChunkType;

/// Error types for PNG framing
#[derive(Error, Debug)]
pub enum PngError {
    /// The underlying buffer operation failed
    #[error(transparent)]
    Buffer(#[from] BufferError),
    /// The first eight bytes are not the PNG signature
    #[error("Bad PNG signature: {found:?}")]
    BadSignature {
        /// Bytes found instead
        found: [u8; 8],
    },
    /// Chunk data length exceeds 2^31 - 1
    #[error("Chunk length {length} exceeds the PNG limit")]
    ChunkTooLong {
        /// Declared length
        length: u32,
    },
    /// Chunk type bytes are not ASCII letters
    #[error("Invalid chunk type: {bytes:?}")]
    InvalidChunkType {
        /// The offending type bytes
        bytes: [u8; 4],
    },
    /// Stored CRC differs from the CRC of the chunk type and data
    #[error("CRC mismatch in chunk {chunk_type}: stored {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        /// Type of the damaged chunk
        chunk_type: ChunkType,
        /// CRC stored in the stream
        expected: u32,
        /// CRC computed over the chunk
        actual: u32,
    },
}

pub type Result<T> = core::result::Result<T, PngError>;
