//! `pngframe`: PNG signature and chunk framing over `segbuf` buffers.
//!
//! Covers the container layer only: the 8-byte signature and the
//! length / type / data / CRC framing of chunks. Chunk contents are handed
//! out as read-only extractions of the source buffer.
//!
//! Buffers of any byte order work; framing integers are always big-endian.
//!
//! # Example
//!
//! ```
//! use pngframe::{read_chunk, read_signature, write_chunk, write_signature, ChunkType};
//! use segbuf::{Buffer, BufferOptions};
//!
//! let mut buffer = Buffer::new(BufferOptions::new()).unwrap();
//! write_signature(&mut buffer).unwrap();
//! write_chunk(&mut buffer, ChunkType::IEND, &[]).unwrap();
//!
//! read_signature(&mut buffer).unwrap();
//! let chunk = read_chunk(&mut buffer).unwrap();
//! assert_eq!(chunk.chunk_type(), ChunkType::IEND);
//! assert_eq!(chunk.crc(), 0xAE42_6082);
//! ```

mod chunk;
mod error;
mod frame;

pub use chunk::{Chunk, ChunkType};
pub use error::{PngError, Result};
pub use frame::{
    read_chunk, read_chunks, read_signature, write_chunk, write_chunk_from, write_signature,
    MAX_CHUNK_LENGTH, PNG_SIGNATURE,
};
