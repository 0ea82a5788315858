//! Snapshot loading configuration.
//!
//! The identifier width and byte order come from the dump header. Loaders
//! either fill a [`SnapshotConfig`] from that header or deserialize one.

use heap_types::{ByteOrder, IdSize};
use serde::{Deserialize, Serialize};

/// Layout parameters of a dump's backing buffer.
///
/// # Examples
///
/// ```
/// use heap_graph::SnapshotConfig;
/// use heap_types::{ByteOrder, IdSize};
///
/// let config: SnapshotConfig = serde_json::from_str(r#"{ "id_size": 8 }"#).unwrap();
/// assert_eq!(config.id_size, IdSize::Eight);
/// assert_eq!(config.byte_order, ByteOrder::BigEndian);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Width of object identifiers
    pub id_size: IdSize,
    /// Byte order of multi-byte values
    pub byte_order: ByteOrder,
}

impl SnapshotConfig {
    /// Creates a configuration from the identifier width found in a dump header.
    ///
    /// # Errors
    ///
    /// Returns [`heap_types::HeapError::UnsupportedIdSize`] for widths other
    /// than 1, 2, 4 or 8.
    pub fn from_header(id_width: u8) -> heap_types::Result<Self> {
        Ok(SnapshotConfig {
            id_size: IdSize::try_from(id_width)?,
            byte_order: ByteOrder::BigEndian,
        })
    }
}
