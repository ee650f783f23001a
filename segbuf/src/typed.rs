//! Typed, byte-order aware reads and writes.

use crate::buffer::Buffer;
use crate::endian::Primitive;
use crate::error::{BufferError, Result};
use crate::options::FlushLevel;

const MAX_PRIMITIVE_SIZE: usize = 8;

impl Buffer {
    /// Reads one value, converting from the buffer's byte order.
    ///
    /// # Errors
    ///
    /// See `read_bytes`.
    pub fn read_value<T: Primitive>(&mut self) -> Result<T> {
        self.check_readable("read_value")?;
        self.enhance(T::SIZE, false)?;
        let mut raw = [0u8; MAX_PRIMITIVE_SIZE];
        let raw = &mut raw[..T::SIZE];
        self.retrieve(raw);
        self.converter.convert_array(raw, T::SIZE);
        Ok(T::from_native(raw))
    }

    /// Fills `out` with consecutive values.
    ///
    /// Enhances the whole extent once and converts the whole array in one pass.
    ///
    /// # Errors
    ///
    /// See `read_bytes`.
    pub fn read_array<T: Primitive>(&mut self, out: &mut [T]) -> Result<()> {
        self.check_readable("read_array")?;
        let total = out
            .len()
            .checked_mul(T::SIZE)
            .ok_or(BufferError::InvalidCount { count: i64::MAX })?;
        self.enhance(total, false)?;
        let mut raw = vec![0u8; total];
        self.retrieve(&mut raw);
        self.converter.convert_array(&mut raw, T::SIZE);
        for (value, bytes) in out.iter_mut().zip(raw.chunks_exact(T::SIZE)) {
            *value = T::from_native(bytes);
        }
        Ok(())
    }

    /// Writes one value, converting to the buffer's byte order.
    ///
    /// # Errors
    ///
    /// See `write_bytes`.
    pub fn write_value<T: Primitive>(&mut self, value: T) -> Result<()> {
        self.check_writable("write_value")?;
        let mut raw = [0u8; MAX_PRIMITIVE_SIZE];
        let raw = &mut raw[..T::SIZE];
        value.to_native(raw);
        self.converter.convert_array(raw, T::SIZE);
        self.write_raw(raw)?;
        self.auto_flush(FlushLevel::All)
    }

    /// Writes consecutive values.
    ///
    /// # Errors
    ///
    /// See `write_bytes`.
    pub fn write_array<T: Primitive>(&mut self, values: &[T]) -> Result<()> {
        self.check_writable("write_array")?;
        let mut raw = vec![0u8; values.len() * T::SIZE];
        for (value, bytes) in values.iter().zip(raw.chunks_exact_mut(T::SIZE)) {
            value.to_native(bytes);
        }
        self.converter.convert_array(&mut raw, T::SIZE);
        self.write_raw(&raw)?;
        self.auto_flush(FlushLevel::MultiByte)
    }
}

macro_rules! typed_accessors {
    ($($ty:ty => $read:ident, $write:ident, $read_arr:ident, $write_arr:ident;)*) => {
        impl Buffer {
            $(
                #[doc = concat!("Reads a `", stringify!($ty), "`.")]
                ///
                /// # Errors
                ///
                /// See `read_bytes`.
                pub fn $read(&mut self) -> Result<$ty> {
                    self.read_value::<$ty>()
                }

                #[doc = concat!("Writes a `", stringify!($ty), "`.")]
                ///
                /// # Errors
                ///
                /// See `write_bytes`.
                pub fn $write(&mut self, value: $ty) -> Result<()> {
                    self.write_value(value)
                }

                #[doc = concat!("Reads an array of `", stringify!($ty), "`.")]
                ///
                /// # Errors
                ///
                /// See `read_bytes`.
                pub fn $read_arr(&mut self, out: &mut [$ty]) -> Result<()> {
                    self.read_array(out)
                }

                #[doc = concat!("Writes an array of `", stringify!($ty), "`.")]
                ///
                /// # Errors
                ///
                /// See `write_bytes`.
                pub fn $write_arr(&mut self, values: &[$ty]) -> Result<()> {
                    self.write_array(values)
                }
            )*
        }
    };
}

typed_accessors! {
    i8 => read_i8, write_i8, read_i8_array, write_i8_array;
    i16 => read_i16, write_i16, read_i16_array, write_i16_array;
    i32 => read_i32, write_i32, read_i32_array, write_i32_array;
    i64 => read_i64, write_i64, read_i64_array, write_i64_array;
    u8 => read_u8, write_u8, read_u8_array, write_u8_array;
    u16 => read_u16, write_u16, read_u16_array, write_u16_array;
    u32 => read_u32, write_u32, read_u32_array, write_u32_array;
    u64 => read_u64, write_u64, read_u64_array, write_u64_array;
    f32 => read_f32, write_f32, read_f32_array, write_f32_array;
    f64 => read_f64, write_f64, read_f64_array, write_f64_array;
}
