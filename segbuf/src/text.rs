use crate::buffer::Buffer;
use crate::error::{BufferError, Result};
use crate::options::FlushLevel;

impl Buffer {
    /// Writes UTF-8 text. Empty strings are a no-op.
    ///
    /// # Errors
    ///
    /// See `write_bytes`.
    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.check_writable("write_str")?;
        if text.is_empty() {
            return Ok(());
        }
        self.write_raw(text.as_bytes())?;
        self.auto_flush(FlushLevel::Text)
    }

    /// # Errors
    ///
    /// See `write_bytes`.
    pub fn write_tab(&mut self) -> Result<()> {
        self.write_str("\t")
    }

    /// Writes the configured line terminator.
    ///
    /// # Errors
    ///
    /// See `write_bytes`.
    pub fn write_newline(&mut self) -> Result<()> {
        self.check_writable("write_newline")?;
        self.write_raw(self.options.newline.as_bytes())?;
        self.auto_flush(FlushLevel::Text)
    }

    /// # Errors
    ///
    /// See `write_bytes`.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.write_str(text)?;
        self.write_newline()
    }

    /// Reads up to the next LF, CR or CRLF, which is consumed but not returned.
    ///
    /// Returns `None` at the end of the buffer. Invalid UTF-8 is replaced.
    ///
    /// # Errors
    ///
    /// - `BufferError::MaxPosUnknown` if the buffer has no known or growing end
    /// - otherwise see `read_bytes`
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.check_readable("read_line")?;
        let end = self.readable_end().ok_or(BufferError::MaxPosUnknown)?;
        if self.read.pos >= end {
            return Ok(None);
        }
        let mut line = Vec::new();
        while self.read.pos < end {
            match self.read_u8()? {
                b'\n' => break,
                b'\r' => {
                    if self.read.pos < end && self.peek_u8()? == b'\n' {
                        self.read.pos += 1;
                    }
                    break;
                }
                byte => line.push(byte),
            }
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    /// The byte under the read cursor, without consuming it.
    ///
    /// # Errors
    ///
    /// See `read_bytes`.
    pub fn peek_u8(&mut self) -> Result<u8> {
        let saved = self.read;
        let byte = self.read_u8();
        self.read = saved;
        byte
    }
}
