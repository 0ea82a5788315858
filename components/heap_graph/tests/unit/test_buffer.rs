//! Tests for buffer reads and configuration.

use heap_graph::{HprofBuffer, SnapshotConfig};
use heap_types::{ByteOrder, HeapError, IdSize, ObjectId};

#[test]
fn test_read_id_per_width() {
    let bytes = vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
    let expected = [
        (IdSize::One, 0x01),
        (IdSize::Two, 0x0102),
        (IdSize::Four, 0x0102_0304),
        (IdSize::Eight, 0x0102_0304_0506_0708),
    ];
    for (id_size, raw) in expected {
        let buffer = HprofBuffer::new(bytes.clone(), id_size, ByteOrder::BigEndian);
        let mut cursor = buffer.cursor(0);
        assert_eq!(cursor.read_id().unwrap(), ObjectId(raw));
        assert_eq!(cursor.position(), id_size.bytes());
    }
}

#[test]
fn test_ids_are_zero_extended() {
    let buffer = HprofBuffer::new(vec![0xff, 0xfe], IdSize::Two, ByteOrder::BigEndian);
    assert_eq!(buffer.cursor(0).read_id().unwrap(), ObjectId(0xfffe));
}

#[test]
fn test_little_endian_numbers() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0x1234u16.to_le_bytes());
    bytes.extend_from_slice(&(-5i32).to_le_bytes());
    bytes.extend_from_slice(&1.5f64.to_le_bytes());
    let buffer = HprofBuffer::new(bytes, IdSize::Four, ByteOrder::LittleEndian);
    let mut cursor = buffer.cursor(0);
    assert_eq!(cursor.read_u16().unwrap(), 0x1234);
    assert_eq!(cursor.read_i32().unwrap(), -5);
    assert_eq!(cursor.read_f64().unwrap(), 1.5);
    assert_eq!(cursor.remaining(), 0);
}

#[test]
fn test_underflow_keeps_position() {
    let buffer = HprofBuffer::new(vec![0u8; 3], IdSize::Four, ByteOrder::BigEndian);
    let mut cursor = buffer.cursor(1);
    assert_eq!(
        cursor.read_u32(),
        Err(HeapError::BufferUnderflow {
            offset: 1,
            wanted: 4,
            len: 3
        })
    );
    assert_eq!(cursor.position(), 1);
    assert!(cursor.skip(3).is_err());
    cursor.skip(2).unwrap();
    assert_eq!(cursor.remaining(), 0);
}

#[test]
fn test_cursor_past_end_fails_on_read() {
    let buffer = HprofBuffer::new(vec![1u8], IdSize::Four, ByteOrder::BigEndian);
    let mut cursor = buffer.cursor(10);
    assert_eq!(cursor.remaining(), 0);
    assert!(cursor.read_u8().is_err());
    cursor.seek(0);
    assert_eq!(cursor.read_u8().unwrap(), 1);
}

#[test]
fn test_buffer_from_config() {
    let config = SnapshotConfig::from_header(2).unwrap();
    let buffer = HprofBuffer::with_config(vec![0u8; 4], &config);
    assert_eq!(buffer.id_size(), IdSize::Two);
    assert_eq!(buffer.byte_order(), ByteOrder::BigEndian);
    assert_eq!(buffer.len(), 4);
    assert!(HprofBuffer::empty().is_empty());
}

#[test]
fn test_config_round_trips_through_json() {
    let config = SnapshotConfig {
        id_size: IdSize::Eight,
        byte_order: ByteOrder::LittleEndian,
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(json, r#"{"id_size":8,"byte_order":"little_endian"}"#);
    let back: SnapshotConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
    assert!(serde_json::from_str::<SnapshotConfig>(r#"{"id_size":3}"#).is_err());
}
