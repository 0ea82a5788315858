//! Integration test suite for the heap snapshot components
//!
//! This crate provides end-to-end tests that load synthetic dump buffers
//! through `heap_graph` and query them with `heap_types` values.

use heap_graph::SnapshotConfig;
use heap_types::{ByteOrder, IdSize};

/// Re-export components for test convenience
pub mod components {
    pub use heap_graph;
    pub use heap_types;
}

/// Writes dump bytes in the layout described by a [`SnapshotConfig`].
///
/// Every `put_*` call returns the offset the value was written at.
#[derive(Debug, Default)]
pub struct DumpWriter {
    config: SnapshotConfig,
    bytes: Vec<u8>,
}

impl DumpWriter {
    /// Creates an empty writer.
    pub fn new(config: SnapshotConfig) -> Self {
        DumpWriter {
            config,
            bytes: Vec::new(),
        }
    }

    /// Returns the offset the next value will be written at.
    pub fn offset(&self) -> usize {
        self.bytes.len()
    }

    /// Writes an identifier using the configured width.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not fit in the configured width.
    pub fn put_id(&mut self, id: u64) -> usize {
        let offset = self.offset();
        let width = self.config.id_size.bytes();
        let full = self.order(&id.to_be_bytes(), &id.to_le_bytes());
        match self.config.byte_order {
            ByteOrder::BigEndian => {
                assert!(full[..8 - width].iter().all(|&b| b == 0), "id {id:#x} too wide");
                self.bytes.extend_from_slice(&full[8 - width..]);
            }
            ByteOrder::LittleEndian => {
                assert!(full[width..].iter().all(|&b| b == 0), "id {id:#x} too wide");
                self.bytes.extend_from_slice(&full[..width]);
            }
        }
        offset
    }

    /// Writes a 32-bit integer.
    pub fn put_i32(&mut self, value: i32) -> usize {
        let offset = self.offset();
        let bytes = self.order(&value.to_be_bytes(), &value.to_le_bytes());
        self.bytes.extend_from_slice(&bytes);
        offset
    }

    /// Writes a 64-bit integer.
    pub fn put_i64(&mut self, value: i64) -> usize {
        let offset = self.offset();
        let bytes = self.order(&value.to_be_bytes(), &value.to_le_bytes());
        self.bytes.extend_from_slice(&bytes);
        offset
    }

    /// Writes a single byte.
    pub fn put_u8(&mut self, value: u8) -> usize {
        let offset = self.offset();
        self.bytes.push(value);
        offset
    }

    /// Returns the identifier width in use.
    pub fn id_size(&self) -> IdSize {
        self.config.id_size
    }

    /// Finishes the dump.
    pub fn finish(self) -> (Vec<u8>, SnapshotConfig) {
        (self.bytes, self.config)
    }

    fn order(&self, big: &[u8], little: &[u8]) -> Vec<u8> {
        match self.config.byte_order {
            ByteOrder::BigEndian => big.to_vec(),
            ByteOrder::LittleEndian => little.to_vec(),
        }
    }
}
