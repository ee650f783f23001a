use embedded_io::Read;

/// Hands out data in chunks of at most `chunk_size` bytes, then optionally fails.
pub struct ChunkReader {
    data: Vec<u8>,
    position: usize,
    chunk_size: usize,
    fail_at_end: bool,
}

impl ChunkReader {
    #[allow(dead_code)]
    pub fn new(data: Vec<u8>, chunk_size: usize) -> Self {
        ChunkReader {
            data,
            position: 0,
            chunk_size,
            fail_at_end: false,
        }
    }

    #[allow(dead_code)]
    pub fn failing(data: Vec<u8>, chunk_size: usize) -> Self {
        ChunkReader {
            fail_at_end: true,
            ..ChunkReader::new(data, chunk_size)
        }
    }
}

impl embedded_io::ErrorType for ChunkReader {
    type Error = embedded_io::ErrorKind;
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.position >= self.data.len() {
            if self.fail_at_end {
                return Err(embedded_io::ErrorKind::Interrupted);
            }
            return Ok(0);
        }

        let remaining_data = &self.data[self.position..];
        let bytes_to_write = self.chunk_size.min(buf.len()).min(remaining_data.len());
        buf[..bytes_to_write].copy_from_slice(&remaining_data[..bytes_to_write]);
        self.position += bytes_to_write;
        Ok(bytes_to_write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_reader() {
        let mut reader = ChunkReader::new(vec![1, 2, 3, 4, 5, 6, 7], 3);

        let mut buf = [0u8; 10];

        let n = reader.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[1, 2, 3]);

        let n = reader.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[4, 5, 6]);

        let n = reader.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[7]);

        // EOF
        let n = reader.read(&mut buf).unwrap();
        assert_eq!(n, 0);
    }
}
