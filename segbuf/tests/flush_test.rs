use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use segbuf::{Buffer, BufferOptions, Endianness, FlushLevel};

#[derive(Clone, Default)]
struct SharedSink(Rc<RefCell<Vec<u8>>>);

impl SharedSink {
    fn contents(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn sink_buffer(level: FlushLevel) -> (Buffer, SharedSink) {
    let sink = SharedSink::default();
    let options = BufferOptions::new()
        .with_part_size(16)
        .with_flush_level(level);
    let buffer = Buffer::with_sink(sink.clone(), options).unwrap();
    (buffer, sink)
}

#[test]
fn test_explicit_flush_only() {
    let (mut buffer, sink) = sink_buffer(FlushLevel::None);
    buffer.write_bytes(&[1u8; 40]).unwrap();
    assert!(sink.contents().is_empty());

    buffer.flush().unwrap();
    assert_eq!(sink.contents(), vec![1u8; 40]);

    buffer.write_bytes(b"more").unwrap();
    buffer.release().unwrap();
    assert_eq!(sink.contents().len(), 44);
    assert_eq!(&sink.contents()[40..], b"more");
}

#[test]
fn test_auto_flushes_full_parts() {
    let (mut buffer, sink) = sink_buffer(FlushLevel::Auto);
    buffer.write_bytes(b"0123456789").unwrap();
    assert!(sink.contents().is_empty());
    buffer.write_bytes(b"abcdefghij").unwrap();
    assert_eq!(sink.contents(), b"0123456789abcdefghij");
    buffer.write_str("tail").unwrap();
    assert_eq!(sink.contents().len(), 20);
}

#[test]
fn test_text_level_flushes_text_only() {
    let (mut buffer, sink) = sink_buffer(FlushLevel::Text);
    buffer.write_bytes(b"raw").unwrap();
    assert!(sink.contents().is_empty());
    buffer.write_str("text").unwrap();
    assert_eq!(sink.contents(), b"rawtext");
}

#[test]
fn test_all_level_flushes_values() {
    let sink = SharedSink::default();
    let options = BufferOptions::new()
        .with_flush_level(FlushLevel::All)
        .with_endianness(Endianness::Big);
    let mut buffer = Buffer::with_sink(sink.clone(), options).unwrap();
    buffer.write_u16(0xCAFE).unwrap();
    assert_eq!(sink.contents(), vec![0xCA, 0xFE]);
    buffer.write_bits(0b1, 1).unwrap();
    assert_eq!(sink.contents().len(), 2);
    buffer.pad_write_bits().unwrap();
    assert_eq!(sink.contents(), vec![0xCA, 0xFE, 0x01]);
}

#[test]
fn test_gaps_are_flushed_as_zeros() {
    let (mut buffer, sink) = sink_buffer(FlushLevel::None);
    buffer.write_bytes(b"ab").unwrap();
    buffer.seek_write_absolute(50).unwrap();
    buffer.write_bytes(b"cd").unwrap();
    buffer.flush().unwrap();

    let mut expected = b"ab".to_vec();
    expected.resize(50, 0);
    expected.extend_from_slice(b"cd");
    assert_eq!(sink.contents(), expected);
}

#[test]
fn test_flush_without_sink_is_noop() {
    let mut buffer = Buffer::new(BufferOptions::new().with_flush_level(FlushLevel::All)).unwrap();
    buffer.write_bytes(b"kept").unwrap();
    buffer.flush().unwrap();
    assert_eq!(buffer.read_vec(4).unwrap(), b"kept");
}

#[test]
fn test_create_file_receives_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.bin");
    let mut buffer = Buffer::create_file(&path, BufferOptions::new()).unwrap();
    buffer.write_line("hello").unwrap();
    buffer.write_u8(0).unwrap();
    buffer.release().unwrap();

    let mut expected = b"hello".to_vec();
    expected.extend_from_slice(segbuf::Newline::Native.as_bytes());
    expected.push(0);
    assert_eq!(std::fs::read(&path).unwrap(), expected);
}

#[test]
fn test_flushed_file_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("round.bin");
    let mut writer = Buffer::create_file(&path, BufferOptions::new()).unwrap();
    writer.write_bytes(&[9u8; 10_000]).unwrap();
    writer.release().unwrap();

    let mut reader = Buffer::from_file(&path, BufferOptions::new()).unwrap();
    assert_eq!(reader.compute_max_pos().unwrap(), 10_000);
    reader.seek_read_absolute(9_990).unwrap();
    assert_eq!(reader.read_vec(10).unwrap(), vec![9u8; 10]);
}
