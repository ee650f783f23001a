//! Signature and chunk framing: length, type, data, CRC.

use segbuf::{Buffer, Checksum, ChecksumKind};

use crate::chunk::{Chunk, ChunkType};
use crate::error::{PngError, Result};

/// The eight bytes every PNG stream starts with
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Largest chunk data length allowed by PNG
pub const MAX_CHUNK_LENGTH: u32 = 0x7FFF_FFFF;

/// # Errors
///
/// From the underlying buffer.
pub fn write_signature(buffer: &mut Buffer) -> Result<()> {
    buffer.write_bytes(&PNG_SIGNATURE)?;
    Ok(())
}

/// Consumes the signature.
///
/// # Errors
///
/// - `PngError::BadSignature` if the bytes differ
/// - buffer errors, e.g. when fewer than eight bytes are left
pub fn read_signature(buffer: &mut Buffer) -> Result<()> {
    let mut found = [0u8; 8];
    buffer.read_bytes(&mut found)?;
    if found != PNG_SIGNATURE {
        return Err(PngError::BadSignature { found });
    }
    Ok(())
}

fn checked_length(len: usize) -> Result<u32> {
    match u32::try_from(len) {
        Ok(length) if length <= MAX_CHUNK_LENGTH => Ok(length),
        _ => Err(PngError::ChunkTooLong {
            length: u32::try_from(len).unwrap_or(u32::MAX),
        }),
    }
}

/// Writes a complete chunk at the buffer's write cursor.
///
/// # Errors
///
/// - `PngError::ChunkTooLong` if `data` exceeds `MAX_CHUNK_LENGTH`
/// - buffer errors
pub fn write_chunk(buffer: &mut Buffer, chunk_type: ChunkType, data: &[u8]) -> Result<()> {
    let length = checked_length(data.len())?;
    let mut crc = Checksum::new(ChecksumKind::Crc32);
    crc.accumulate(chunk_type.as_bytes());
    crc.accumulate(data);

    buffer.write_bytes(&length.to_be_bytes())?;
    buffer.write_bytes(chunk_type.as_bytes())?;
    if !data.is_empty() {
        buffer.write_bytes(data)?;
    }
    buffer.write_bytes(&crc.result().to_be_bytes())?;
    tracing::trace!(%chunk_type, length, "chunk written");
    Ok(())
}

/// Writes a chunk whose data are the next `len` bytes of `src`.
///
/// The bytes go from `src`'s parts straight into `buffer`; `src`'s read
/// cursor moves past them.
///
/// # Errors
///
/// - `PngError::ChunkTooLong` if `len` exceeds `MAX_CHUNK_LENGTH`
/// - buffer errors, e.g. when `src` has fewer than `len` bytes left
pub fn write_chunk_from(
    buffer: &mut Buffer,
    chunk_type: ChunkType,
    src: &mut Buffer,
    len: usize,
) -> Result<()> {
    let length = checked_length(len)?;
    let mut data = Buffer::extract(src, len)?;
    let mut crc = Checksum::new(ChecksumKind::Crc32);
    crc.accumulate(chunk_type.as_bytes());
    data.accumulate_to_checksum(&mut crc)?;

    buffer.write_bytes(&length.to_be_bytes())?;
    buffer.write_bytes(chunk_type.as_bytes())?;
    if len > 0 {
        buffer.write_buffer(&mut data, len)?;
    }
    buffer.write_bytes(&crc.result().to_be_bytes())?;
    Ok(())
}

fn read_be_u32(buffer: &mut Buffer) -> Result<u32> {
    let mut word = [0u8; 4];
    buffer.read_bytes(&mut word)?;
    Ok(u32::from_be_bytes(word))
}

/// Reads the chunk at the buffer's read cursor and verifies its CRC.
///
/// The chunk data is not copied: the returned chunk holds an extraction of
/// `buffer`.
///
/// # Errors
///
/// - `PngError::ChunkTooLong` for a length above `MAX_CHUNK_LENGTH`
/// - `PngError::InvalidChunkType` if the type is not four ASCII letters
/// - `PngError::ChecksumMismatch` if the stored CRC is wrong
/// - buffer errors, e.g. for a truncated chunk
pub fn read_chunk(buffer: &mut Buffer) -> Result<Chunk> {
    let length = read_be_u32(buffer)?;
    if length > MAX_CHUNK_LENGTH {
        return Err(PngError::ChunkTooLong { length });
    }
    let data_len = usize::try_from(length).map_err(|_| PngError::ChunkTooLong { length })?;

    let mut typed = Buffer::extract(buffer, 4 + data_len)?;
    let mut crc = Checksum::new(ChecksumKind::Crc32);
    typed.accumulate_to_checksum(&mut crc)?;
    let actual = crc.result();

    let mut type_bytes = [0u8; 4];
    typed.read_bytes(&mut type_bytes)?;
    let chunk_type = ChunkType::new(type_bytes)?;
    let data = Buffer::extract(&mut typed, data_len)?;

    let expected = read_be_u32(buffer)?;
    if expected != actual {
        tracing::warn!(%chunk_type, expected, actual, "chunk CRC mismatch");
        return Err(PngError::ChecksumMismatch {
            chunk_type,
            expected,
            actual,
        });
    }
    tracing::trace!(%chunk_type, length, "chunk read");
    Ok(Chunk::new(chunk_type, data, expected))
}

/// Reads chunks up to and including `IEND`, or to the end of the buffer.
///
/// # Errors
///
/// See `read_chunk`.
pub fn read_chunks(buffer: &mut Buffer) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    while !buffer.is_read_at_end() {
        let chunk = read_chunk(buffer)?;
        let done = chunk.chunk_type() == ChunkType::IEND;
        chunks.push(chunk);
        if done {
            break;
        }
    }
    Ok(chunks)
}
