//! `segbuf`: a sparse, segmented, lazily materialized byte buffer.
//!
//! A `Buffer` is a byte-addressable linear memory built from an ordered list
//! of parts. Each part is a contiguous block placed at an absolute offset;
//! the space between parts is sparse and costs nothing. When a read or write
//! touches a range no part backs yet, the buffer materializes it on demand
//! ("enhance"), filling new parts from its source if it has one.
//!
//! Buffers come in four flavours:
//!
//! - free-standing accumulators (`Buffer::new`), readable, writable, growing;
//! - byte-array readers (`Buffer::from_bytes`) with a known size;
//! - file and stream readers (`Buffer::from_file`, `Buffer::from_stream`)
//!   whose size is unknown until computed;
//! - extractions (`Buffer::extract`), read-only windows sharing the storage
//!   of another buffer.
//!
//! On top of the byte transfer sit typed, byte-order aware accessors, bit
//! I/O, simple text I/O, buffer-to-buffer copies and checksums.
//!
//! # Performance Characteristics
//!
//! - Part lookup walks from a cached cursor, so sequential and locally
//!   clustered access is O(1) amortized; scattered access falls back to a
//!   binary search when no cursor is cached.
//! - Parts are sized in multiples of `BufferOptions::part_size`
//!   (default 4096). Filling a hole backwards starts the new part at the
//!   requested position, so many small backward writes fragment the list.
//! - Reading a few bytes deep inside a large file materializes only the parts
//!   around them.
//!
//! # Example
//!
//! ```
//! # use segbuf::{Buffer, BufferOptions, Endianness};
//! let options = BufferOptions::new().with_endianness(Endianness::Big);
//! let mut buffer = Buffer::new(options).unwrap();
//!
//! buffer.write_u32(0xDEAD_BEEF).unwrap();
//! buffer.write_str("abc").unwrap();
//!
//! assert_eq!(buffer.read_vec(4).unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
//! assert_eq!(buffer.read_vec(3).unwrap(), b"abc");
//!
//! buffer.seek_read_absolute(0).unwrap();
//! assert_eq!(buffer.read_u32().unwrap(), 0xDEAD_BEEF);
//! ```
//!
//! # Extractions
//!
//! ```
//! # use segbuf::{Buffer, BufferOptions};
//! let mut source = Buffer::from_bytes(&b"ABCDEFGH"[..], BufferOptions::new()).unwrap();
//! source.seek_read_absolute(2).unwrap();
//!
//! let mut view = Buffer::extract(&mut source, 4).unwrap();
//! assert_eq!(view.read_vec(4).unwrap(), b"CDEF");
//! assert_eq!(source.read_pos(), 6);
//! assert!(view.shares_storage_with(&source));
//! ```
//!
//! # Bits
//!
//! Bits are read and written least significant first:
//!
//! ```
//! # use segbuf::{Buffer, BufferOptions};
//! let mut buffer = Buffer::new(BufferOptions::new()).unwrap();
//! buffer.write_bits(0b101, 3).unwrap();
//! buffer.pad_write_bits().unwrap();
//!
//! assert!(buffer.read_bit().unwrap());
//! assert_eq!(buffer.read_bits(2).unwrap(), 0b10);
//! buffer.pad_read_bits().unwrap();
//! assert!(buffer.is_read_at_end());
//! ```

mod bits;
mod block;
mod buffer;
mod checksum;
mod compound;
mod endian;
mod enhance;
mod error;
mod iter;
mod options;
mod part;
mod part_list;
mod source;
mod text;
mod typed;

// Re-export public types and traits
pub use block::Block;
pub use buffer::{Buffer, Capabilities};
pub use checksum::{Checksum, ChecksumKind};
pub use endian::{Converter, Endianness, Primitive};
pub use error::{BufferError, Capability, Result};
pub use iter::{PartIter, PartRevIter, SpanIter};
pub use options::{BufferOptions, FlushLevel, Newline, DEFAULT_PART_SIZE, MIN_PART_SIZE};
pub use part::Part;
pub use part_list::{Location, PartList};
pub use source::{Sink, Source, StreamRead};
