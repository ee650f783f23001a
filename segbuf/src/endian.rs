//! Endianness conversion of raw value bytes.
//!
//! A `Converter` is built from the byte order of the buffer's data and the
//! native byte order. Converting is an in-place swap or a no-op; the same
//! converter serves both directions since swapping is its own inverse.

/// Byte order of multi-byte values stored in a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    Little,
    Big,
    /// Whatever the running machine uses
    #[default]
    Native,
    /// Alias for big endian
    Network,
}

impl Endianness {
    /// Resolves `Native` and `Network` to a concrete byte order.
    #[must_use]
    pub fn resolve(self) -> Endianness {
        match self {
            Endianness::Native if cfg!(target_endian = "big") => Endianness::Big,
            Endianness::Native => Endianness::Little,
            Endianness::Network => Endianness::Big,
            other => other,
        }
    }
}

/// In-place byte order converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Converter {
    swap: bool,
}

impl Converter {
    #[must_use]
    pub fn new(from: Endianness, to: Endianness) -> Self {
        Self {
            swap: from.resolve() != to.resolve(),
        }
    }

    /// Converter between `data` order and the native order.
    #[must_use]
    pub fn to_native(data: Endianness) -> Self {
        Self::new(data, Endianness::Native)
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        !self.swap
    }

    /// Single-byte values never change.
    pub fn convert8(&self, _bytes: &mut [u8]) {}

    pub fn convert16(&self, bytes: &mut [u8]) {
        self.convert_array(bytes, 2);
    }

    pub fn convert32(&self, bytes: &mut [u8]) {
        self.convert_array(bytes, 4);
    }

    pub fn convert64(&self, bytes: &mut [u8]) {
        self.convert_array(bytes, 8);
    }

    /// Converts a packed array of `width`-byte values.
    ///
    /// Trailing bytes that do not form a whole value are left untouched.
    pub fn convert_array(&self, bytes: &mut [u8], width: usize) {
        if !self.swap || width < 2 {
            return;
        }
        for value in bytes.chunks_exact_mut(width) {
            value.reverse();
        }
    }
}

/// Fixed-size value that can be moved through a buffer as raw bytes
pub trait Primitive: Copy {
    /// Size of the encoded value in bytes
    const SIZE: usize;

    /// Decodes from native-order bytes; `bytes` holds exactly `SIZE` bytes.
    fn from_native(bytes: &[u8]) -> Self;

    /// Encodes into native-order bytes; `out` holds exactly `SIZE` bytes.
    fn to_native(self, out: &mut [u8]);
}

macro_rules! impl_primitive {
    ($($ty:ty),*) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = core::mem::size_of::<$ty>();

                #[allow(clippy::expect_used)]
                fn from_native(bytes: &[u8]) -> Self {
                    <$ty>::from_ne_bytes(bytes.try_into().expect("Caller passes SIZE bytes"))
                }

                fn to_native(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

impl_primitive!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
