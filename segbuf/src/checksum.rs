//! Checksum accumulators fed from buffer contents.

/// Supported checksum algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    /// CRC-32 (IEEE), as used by PNG and ZIP
    Crc32,
    /// Adler-32, as used by zlib streams
    Adler32,
}

const ADLER_MOD: u32 = 65521;
// Largest n such that 255 * n * (n + 1) / 2 + (n + 1) * (ADLER_MOD - 1) fits in u32
const ADLER_NMAX: usize = 5552;

#[derive(Debug, Clone)]
enum State {
    Crc32(crc32fast::Hasher),
    Adler32 { a: u32, b: u32 },
}

/// Incremental checksum over byte slices
#[derive(Debug, Clone)]
pub struct Checksum {
    kind: ChecksumKind,
    state: State,
}

impl Checksum {
    #[must_use]
    pub fn new(kind: ChecksumKind) -> Self {
        let state = match kind {
            ChecksumKind::Crc32 => State::Crc32(crc32fast::Hasher::new()),
            ChecksumKind::Adler32 => State::Adler32 { a: 1, b: 0 },
        };
        Self { kind, state }
    }

    #[must_use]
    pub fn kind(&self) -> ChecksumKind {
        self.kind
    }

    pub fn accumulate(&mut self, bytes: &[u8]) {
        match &mut self.state {
            State::Crc32(hasher) => hasher.update(bytes),
            State::Adler32 { a, b } => {
                for chunk in bytes.chunks(ADLER_NMAX) {
                    for &byte in chunk {
                        *a += u32::from(byte);
                        *b += *a;
                    }
                    *a %= ADLER_MOD;
                    *b %= ADLER_MOD;
                }
            }
        }
    }

    /// Checksum of everything accumulated so far.
    #[must_use]
    pub fn result(&self) -> u32 {
        match &self.state {
            State::Crc32(hasher) => hasher.clone().finalize(),
            State::Adler32 { a, b } => (b << 16) | a,
        }
    }

    /// Starts over with the same algorithm.
    pub fn clear(&mut self) {
        *self = Self::new(self.kind);
    }
}
