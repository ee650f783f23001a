mod chunk_reader;

use crate::chunk_reader::ChunkReader;
use segbuf::{Buffer, BufferError, BufferOptions, Capability};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_fix_max_pos_twice_is_rejected() {
    let mut buffer = Buffer::new(BufferOptions::new()).unwrap();
    buffer.write_bytes(b"0123456789").unwrap();
    assert!(buffer.can_extend());
    assert_eq!(buffer.max_pos(), None);

    assert_eq!(buffer.fix_max_pos().unwrap(), 10);
    assert!(!buffer.can_extend());
    assert_eq!(buffer.max_pos(), Some(10));
    assert_eq!(buffer.size().unwrap(), 10);
    assert!(matches!(
        buffer.fix_max_pos(),
        Err(BufferError::MaxPosAlreadyFixed)
    ));
    assert_eq!(buffer.max_pos(), Some(10));
}

#[test]
fn test_fixed_buffer_never_grows() {
    let mut buffer = Buffer::new(BufferOptions::new().with_part_size(16)).unwrap();
    buffer.write_bytes(b"0123456789").unwrap();
    buffer.fix_max_pos().unwrap();

    assert!(matches!(
        buffer.write_u8(b'x'),
        Err(BufferError::OutOfRange { position: 11, min: 0, max: 10 })
    ));
    assert!(buffer.seek_write_absolute(11).is_err());

    buffer.seek_write_absolute(5).unwrap();
    buffer.write_bytes(b"abcde").unwrap();
    assert!(buffer.write_bytes(b"f").is_err());
    assert_eq!(buffer.read_vec(10).unwrap(), b"01234abcde");
    assert!(buffer.read_u8().is_err());
    assert_eq!(buffer.max_pos(), Some(10));
}

#[test]
fn test_reading_grows_free_buffer() {
    let mut buffer = Buffer::new(BufferOptions::new()).unwrap();
    assert_eq!(buffer.read_vec(3).unwrap(), vec![0, 0, 0]);
    assert_eq!(buffer.fix_max_pos().unwrap(), 3);
}

#[test]
fn test_fix_max_pos_needs_growing_buffer() {
    let mut buffer = Buffer::from_bytes(&b"abc"[..], BufferOptions::new()).unwrap();
    assert!(matches!(
        buffer.fix_max_pos(),
        Err(BufferError::MaxPosAlreadyFixed)
    ));

    let mut stream = Buffer::from_stream(&b"abc"[..], BufferOptions::new()).unwrap();
    assert!(matches!(
        stream.fix_max_pos(),
        Err(BufferError::InvalidCapability {
            capability: Capability::Extend,
            ..
        })
    ));
}

#[test]
fn test_seek_modes() {
    let mut buffer = Buffer::from_bytes(&b"ABCDEFGH"[..], BufferOptions::new()).unwrap();
    buffer.seek_read_absolute(3).unwrap();
    buffer.seek_read_relative(2).unwrap();
    assert_eq!(buffer.read_pos(), 5);
    buffer.seek_read_relative(-5).unwrap();
    assert_eq!(buffer.read_pos(), 0);
    assert!(matches!(
        buffer.seek_read_relative(-1),
        Err(BufferError::OutOfRange { position: -1, .. })
    ));
    buffer.seek_read_local(8).unwrap();
    assert!(buffer.is_read_at_end());
    assert!(buffer.seek_read_local(9).is_err());
}

#[test]
fn test_write_seek_needs_output() {
    let mut buffer = Buffer::from_bytes(&b"ABCD"[..], BufferOptions::new()).unwrap();
    assert!(matches!(
        buffer.seek_write_absolute(0),
        Err(BufferError::InvalidCapability {
            capability: Capability::Output,
            ..
        })
    ));
}

#[test]
fn test_capabilities_by_flavour() {
    let free = Buffer::new(BufferOptions::new()).unwrap();
    let caps = free.capabilities();
    assert!(caps.can_input && caps.can_output && caps.can_seek && caps.can_extend);
    assert!(!caps.max_pos_known);

    let bytes = Buffer::from_bytes(vec![1, 2, 3], BufferOptions::new()).unwrap();
    let caps = bytes.capabilities();
    assert!(caps.can_input && !caps.can_output && !caps.can_extend);
    assert!(caps.max_pos_known);
    assert_eq!(bytes.size().unwrap(), 3);
}

#[test]
fn test_invalid_part_size() {
    assert!(matches!(
        Buffer::new(BufferOptions::new().with_part_size(8)),
        Err(BufferError::InvalidConfiguration {
            parameter: "part_size",
            value: 8
        })
    ));
}

#[test]
fn test_clear_resets_growing_buffer() {
    let mut buffer = Buffer::new(BufferOptions::new()).unwrap();
    buffer.write_bytes(b"some bytes").unwrap();
    buffer.read_vec(4).unwrap();
    buffer.clear().unwrap();

    assert_eq!(buffer.part_count(), 0);
    assert_eq!(buffer.read_pos(), 0);
    assert_eq!(buffer.write_pos(), 0);
    assert!(buffer.is_read_at_end());
    buffer.write_bytes(b"new").unwrap();
    assert_eq!(buffer.read_vec(3).unwrap(), b"new");
}

#[test]
fn test_clear_leaves_shared_storage_alone() {
    let mut source = Buffer::new(BufferOptions::new()).unwrap();
    source.write_bytes(b"shared").unwrap();
    let mut view = Buffer::extract(&mut source, 6).unwrap();

    source.clear().unwrap();
    assert!(!view.shares_storage_with(&source));
    assert_eq!(view.read_vec(6).unwrap(), b"shared");
    assert_eq!(source.part_count(), 0);
}

#[test]
fn test_clear_keeps_byte_source_when_shared() {
    let mut source = Buffer::from_bytes(b"ABCDEFGH".to_vec(), BufferOptions::new()).unwrap();
    let mut view = Buffer::extract(&mut source, 3).unwrap();

    source.clear().unwrap();
    assert_eq!(source.read_pos(), 0);
    assert_eq!(source.read_vec(3).unwrap(), b"ABC");
    assert_eq!(source.read_vec(5).unwrap(), b"DEFGH");
    assert_eq!(view.read_vec(3).unwrap(), b"ABC");
}

#[test]
fn test_clear_keeps_file_source_when_shared() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"file contents").unwrap();
    let mut source = Buffer::from_file(file.path(), BufferOptions::new()).unwrap();
    let mut view = Buffer::extract(&mut source, 4).unwrap();

    source.clear().unwrap();
    assert!(!view.shares_storage_with(&source));
    assert_eq!(source.read_vec(13).unwrap(), b"file contents");
    assert_eq!(view.read_vec(4).unwrap(), b"file");
}

#[test]
fn test_clear_extraction_is_rejected() {
    let mut source = Buffer::from_bytes(b"ABCDEFGH".to_vec(), BufferOptions::new()).unwrap();
    let mut view = Buffer::extract(&mut source, 3).unwrap();

    assert!(matches!(
        view.clear(),
        Err(BufferError::InvalidCapability {
            operation: "clear",
            capability: Capability::Owner
        })
    ));
    assert_eq!(view.read_vec(3).unwrap(), b"ABC");
}

#[test]
fn test_clear_shared_stream_is_rejected() {
    let reader = ChunkReader::new(b"streamed".to_vec(), 3);
    let mut source = Buffer::from_stream(reader, BufferOptions::new()).unwrap();
    let mut view = Buffer::extract(&mut source, 6).unwrap();

    assert!(matches!(
        source.clear(),
        Err(BufferError::InvalidCapability {
            capability: Capability::Owner,
            ..
        })
    ));
    assert!(view.shares_storage_with(&source));
    assert_eq!(view.read_vec(6).unwrap(), b"stream");
    assert_eq!(source.read_vec(2).unwrap(), b"ed");
}
