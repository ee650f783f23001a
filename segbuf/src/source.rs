use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::rc::Rc;

use embedded_io::Error as _;
use embedded_io::ErrorKind;

use crate::error::{BufferError, Result};

/// Sequential byte producer behind a `Source::Stream`.
///
/// Implemented for every `embedded_io::Read`.
pub trait StreamRead {
    /// Reads into `buf`, returning the number of bytes read; 0 means end of stream.
    ///
    /// # Errors
    ///
    /// From the underlying reader.
    fn read_chunk(&mut self, buf: &mut [u8]) -> core::result::Result<usize, ErrorKind>;
}

impl<R: embedded_io::Read> StreamRead for R {
    fn read_chunk(&mut self, buf: &mut [u8]) -> core::result::Result<usize, ErrorKind> {
        embedded_io::Read::read(self, buf).map_err(|e| e.kind())
    }
}

/// Where a buffer's bytes come from when Enhance materializes a new part
pub enum Source {
    /// Nothing; fresh parts are zero
    None,
    /// Seekable file
    File(File),
    /// In-memory bytes shared with the caller
    Bytes(Rc<[u8]>),
    /// Sequential reader; can skip forward but never rewind
    Stream {
        reader: Box<dyn StreamRead>,
        position: i64,
    },
}

impl core::fmt::Debug for Source {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Source::None => write!(f, "Source::None"),
            Source::File(file) => write!(f, "Source::File({file:?})"),
            Source::Bytes(bytes) => write!(f, "Source::Bytes {{ len: {} }}", bytes.len()),
            Source::Stream { position, .. } => {
                write!(f, "Source::Stream {{ position: {position} }}")
            }
        }
    }
}

impl Source {
    #[must_use]
    pub fn stream(reader: impl StreamRead + 'static) -> Self {
        Source::Stream {
            reader: Box::new(reader),
            position: 0,
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Source::None)
    }

    /// Reads bytes at absolute `offset` into `dst`.
    ///
    /// Returns how many bytes the source supplied; fewer than `dst.len()` means
    /// the source ended. The rest of `dst` is left untouched.
    ///
    /// # Errors
    ///
    /// - `BufferError::Io` / `BufferError::Stream` from the underlying source
    /// - `BufferError::SourceRewind` if a stream would have to go backwards
    pub fn fill(&mut self, offset: i64, dst: &mut [u8]) -> Result<usize> {
        match self {
            Source::None => Ok(0),
            Source::File(file) => {
                let Ok(start) = u64::try_from(offset) else {
                    return Ok(0);
                };
                file.seek(SeekFrom::Start(start))?;
                let mut n_filled = 0;
                while n_filled < dst.len() {
                    let n_new = file.read(&mut dst[n_filled..])?;
                    if n_new == 0 {
                        break;
                    }
                    n_filled += n_new;
                }
                Ok(n_filled)
            }
            Source::Bytes(bytes) => {
                let Ok(start) = usize::try_from(offset) else {
                    return Ok(0);
                };
                if start >= bytes.len() {
                    return Ok(0);
                }
                let n = dst.len().min(bytes.len() - start);
                dst[..n].copy_from_slice(&bytes[start..start + n]);
                Ok(n)
            }
            Source::Stream { reader, position } => {
                if offset < *position {
                    return Err(BufferError::SourceRewind {
                        requested: offset,
                        position: *position,
                    });
                }
                let mut scratch = [0u8; 256];
                while *position < offset {
                    let want = usize::try_from(offset - *position)
                        .unwrap_or(usize::MAX)
                        .min(scratch.len());
                    let n = reader
                        .read_chunk(&mut scratch[..want])
                        .map_err(BufferError::Stream)?;
                    if n == 0 {
                        return Ok(0);
                    }
                    *position += i64::try_from(n).unwrap_or(i64::MAX);
                }
                let mut n_filled = 0;
                while n_filled < dst.len() {
                    let n = reader
                        .read_chunk(&mut dst[n_filled..])
                        .map_err(BufferError::Stream)?;
                    if n == 0 {
                        break;
                    }
                    n_filled += n;
                    *position += i64::try_from(n).unwrap_or(i64::MAX);
                }
                Ok(n_filled)
            }
        }
    }

    /// A second handle on the same data, for storage that starts over.
    ///
    /// Returns `None` for streams, whose consumed bytes cannot be replayed.
    ///
    /// # Errors
    ///
    /// `BufferError::Io` if the file handle cannot be duplicated.
    pub fn try_clone(&self) -> Result<Option<Source>> {
        Ok(match self {
            Source::None => Some(Source::None),
            Source::File(file) => Some(Source::File(file.try_clone()?)),
            Source::Bytes(bytes) => Some(Source::Bytes(Rc::clone(bytes))),
            Source::Stream { .. } => None,
        })
    }

    /// Physical size of the source, if it has one.
    ///
    /// # Errors
    ///
    /// From reading file metadata.
    pub fn size(&self) -> Result<Option<i64>> {
        match self {
            Source::File(file) => {
                let len = file.metadata()?.len();
                Ok(Some(i64::try_from(len).unwrap_or(i64::MAX)))
            }
            Source::Bytes(bytes) => Ok(Some(i64::try_from(bytes.len()).unwrap_or(i64::MAX))),
            Source::None | Source::Stream { .. } => Ok(None),
        }
    }
}

/// Destination flushed bytes are written to
pub struct Sink {
    writer: Box<dyn Write>,
}

impl Sink {
    pub fn new(writer: impl Write + 'static) -> Self {
        Self {
            writer: Box::new(writer),
        }
    }

    /// # Errors
    ///
    /// From the underlying writer.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    /// # Errors
    ///
    /// From the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl core::fmt::Debug for Sink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Sink {{ .. }}")
    }
}
