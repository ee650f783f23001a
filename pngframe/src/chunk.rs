use core::fmt;

use segbuf::Buffer;

use crate::error::{PngError, Result};

/// Four-letter chunk type code.
///
/// Bit 5 (the ASCII case bit) of each letter carries a property flag:
/// lowercase first letter means ancillary, lowercase second letter means
/// private, lowercase fourth letter means safe to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType([u8; 4]);

const CASE_BIT: u8 = 0x20;

impl ChunkType {
    pub const IHDR: ChunkType = ChunkType(*b"IHDR");
    pub const PLTE: ChunkType = ChunkType(*b"PLTE");
    pub const IDAT: ChunkType = ChunkType(*b"IDAT");
    pub const IEND: ChunkType = ChunkType(*b"IEND");

    /// # Errors
    ///
    /// `PngError::InvalidChunkType` unless all four bytes are ASCII letters.
    pub fn new(bytes: [u8; 4]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_alphabetic) {
            Ok(Self(bytes))
        } else {
            Err(PngError::InvalidChunkType { bytes })
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Decoders must understand critical chunks to display the image.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.0[0] & CASE_BIT == 0
    }

    #[must_use]
    pub fn is_ancillary(&self) -> bool {
        !self.is_critical()
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.0[1] & CASE_BIT == 0
    }

    /// Editors may copy the chunk even if they changed critical chunks.
    #[must_use]
    pub fn is_safe_to_copy(&self) -> bool {
        self.0[3] & CASE_BIT != 0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            write!(f, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

impl TryFrom<&str> for ChunkType {
    type Error = PngError;

    fn try_from(value: &str) -> Result<Self> {
        let bytes: [u8; 4] = value
            .as_bytes()
            .try_into()
            .map_err(|_| PngError::InvalidChunkType { bytes: [0; 4] })?;
        ChunkType::new(bytes)
    }
}

/// A chunk whose CRC has been verified.
///
/// The data is a read-only view into the buffer the chunk was read from;
/// nothing is copied until the caller reads it.
#[derive(Debug)]
pub struct Chunk {
    chunk_type: ChunkType,
    data: Buffer,
    crc: u32,
}

impl Chunk {
    pub(crate) fn new(chunk_type: ChunkType, data: Buffer, crc: u32) -> Self {
        Self {
            chunk_type,
            data,
            crc,
        }
    }

    #[must_use]
    pub fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    /// Length of the chunk data in bytes.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn len(&self) -> usize {
        self.data.size().map_or(0, |size| size as usize)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn crc(&self) -> u32 {
        self.crc
    }

    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.chunk_type.is_critical()
    }

    #[must_use]
    pub fn is_ancillary(&self) -> bool {
        self.chunk_type.is_ancillary()
    }

    /// The chunk data as a buffer, for typed reads.
    pub fn data_mut(&mut self) -> &mut Buffer {
        &mut self.data
    }

    /// Copies the whole chunk data out, independent of the data cursor.
    ///
    /// # Errors
    ///
    /// From the underlying buffer.
    pub fn data_to_vec(&mut self) -> Result<Vec<u8>> {
        let len = self.len();
        if len == 0 {
            return Ok(Vec::new());
        }
        let saved = self.data.read_pos();
        self.data.seek_read_local(0)?;
        let bytes = self.data.read_vec(len);
        self.data.seek_read_absolute(saved)?;
        Ok(bytes?)
    }
}
