use embedded_io::Read;

/// Serves one byte per call, the slowest a stream can be.
///
/// With a byte limit, every call after that many bytes fails with
/// `ErrorKind::TimedOut`, like a connection that stalls mid-stream.
pub struct OneByteReader<I>
where
    I: Iterator<Item = u8>,
{
    bytes: I,
    served: usize,
    stall_after: Option<usize>,
}

impl<I> OneByteReader<I>
where
    I: Iterator<Item = u8>,
{
    #[allow(dead_code)]
    pub fn new(bytes: I) -> Self {
        OneByteReader {
            bytes,
            served: 0,
            stall_after: None,
        }
    }

    #[allow(dead_code)]
    pub fn stalling_after(bytes: I, limit: usize) -> Self {
        OneByteReader {
            stall_after: Some(limit),
            ..OneByteReader::new(bytes)
        }
    }
}

impl<I> embedded_io::ErrorType for OneByteReader<I>
where
    I: Iterator<Item = u8>,
{
    type Error = embedded_io::ErrorKind;
}

impl<I> Read for OneByteReader<I>
where
    I: Iterator<Item = u8>,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.stall_after.is_some_and(|limit| self.served >= limit) {
            return Err(embedded_io::ErrorKind::TimedOut);
        }
        match self.bytes.next() {
            Some(byte) => {
                buf[0] = byte;
                self.served += 1;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
