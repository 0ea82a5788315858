//! Backing byte buffer of a heap dump.
//!
//! The loader hands over the raw dump bytes once. Instances only remember
//! offsets into this buffer; field values are read on demand through a
//! [`BufferCursor`].

use std::sync::Arc;

use heap_types::{ByteOrder, HeapError, IdSize, ObjectId, Result};

use crate::SnapshotConfig;

/// Shared, read-only dump bytes together with their layout parameters.
///
/// Cloning is cheap: the bytes are reference counted.
#[derive(Debug, Clone)]
pub struct HprofBuffer {
    data: Arc<[u8]>,
    id_size: IdSize,
    byte_order: ByteOrder,
}

impl HprofBuffer {
    /// Wraps dump bytes with an explicit identifier width and byte order.
    pub fn new(data: impl Into<Arc<[u8]>>, id_size: IdSize, byte_order: ByteOrder) -> Self {
        HprofBuffer {
            data: data.into(),
            id_size,
            byte_order,
        }
    }

    /// Wraps dump bytes using the layout described by `config`.
    pub fn with_config(data: impl Into<Arc<[u8]>>, config: &SnapshotConfig) -> Self {
        Self::new(data, config.id_size, config.byte_order)
    }

    /// Creates an empty buffer, for snapshots whose edges are all recorded by hand.
    pub fn empty() -> Self {
        Self::new(Vec::new(), IdSize::default(), ByteOrder::default())
    }

    /// Returns the width of object identifiers.
    pub fn id_size(&self) -> IdSize {
        self.id_size
    }

    /// Returns the byte order of multi-byte values.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Returns the number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a cursor positioned at `offset`.
    ///
    /// The offset is not checked here; the first read past the end fails.
    pub fn cursor(&self, offset: usize) -> BufferCursor<'_> {
        BufferCursor {
            buffer: self,
            position: offset,
        }
    }
}

macro_rules! read_number {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.take::<{ std::mem::size_of::<$ty>() }>()?;
            Ok(match self.buffer.byte_order {
                ByteOrder::BigEndian => <$ty>::from_be_bytes(bytes),
                ByteOrder::LittleEndian => <$ty>::from_le_bytes(bytes),
            })
        }
    };
}

/// A read position inside an [`HprofBuffer`].
///
/// Every read advances the position. A read that would run past the end of
/// the buffer fails with [`HeapError::BufferUnderflow`] and leaves the
/// position unchanged.
///
/// # Examples
///
/// ```
/// use heap_graph::HprofBuffer;
/// use heap_types::{ByteOrder, IdSize};
///
/// let buffer = HprofBuffer::new(vec![0x00, 0x2a, 0xff], IdSize::Four, ByteOrder::BigEndian);
/// let mut cursor = buffer.cursor(0);
/// assert_eq!(cursor.read_u16().unwrap(), 42);
/// assert_eq!(cursor.read_i8().unwrap(), -1);
/// assert!(cursor.read_u8().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct BufferCursor<'a> {
    buffer: &'a HprofBuffer,
    position: usize,
}

impl<'a> BufferCursor<'a> {
    /// Returns the current offset.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves to an absolute offset.
    pub fn seek(&mut self, offset: usize) {
        self.position = offset;
    }

    /// Advances past `count` bytes without reading them.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.bounds(count)?;
        self.position += count;
        Ok(())
    }

    /// Returns the number of bytes left before the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Returns the identifier width of the underlying buffer.
    pub fn id_size(&self) -> IdSize {
        self.buffer.id_size
    }

    fn bounds(&self, wanted: usize) -> Result<usize> {
        let len = self.buffer.len();
        self.position
            .checked_add(wanted)
            .filter(|&end| end <= len)
            .ok_or(HeapError::BufferUnderflow {
                offset: self.position,
                wanted,
                len,
            })
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.bounds(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buffer.data[self.position..end]);
        self.position = end;
        Ok(bytes)
    }

    /// Reads an unsigned byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    /// Reads a signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take::<1>()?[0] as i8)
    }

    read_number!(
        /// Reads an unsigned 16-bit value.
        read_u16,
        u16
    );
    read_number!(
        /// Reads a signed 16-bit value.
        read_i16,
        i16
    );
    read_number!(
        /// Reads an unsigned 32-bit value.
        read_u32,
        u32
    );
    read_number!(
        /// Reads a signed 32-bit value.
        read_i32,
        i32
    );
    read_number!(
        /// Reads an unsigned 64-bit value.
        read_u64,
        u64
    );
    read_number!(
        /// Reads a signed 64-bit value.
        read_i64,
        i64
    );
    read_number!(
        /// Reads an IEEE 754 single-precision value.
        read_f32,
        f32
    );
    read_number!(
        /// Reads an IEEE 754 double-precision value.
        read_f64,
        f64
    );

    /// Reads an object identifier of the buffer's recorded width.
    ///
    /// Narrow identifiers are zero-extended to 64 bits.
    pub fn read_id(&mut self) -> Result<ObjectId> {
        let raw = match self.buffer.id_size {
            IdSize::One => u64::from(self.read_u8()?),
            IdSize::Two => u64::from(self.read_u16()?),
            IdSize::Four => u64::from(self.read_u32()?),
            IdSize::Eight => self.read_u64()?,
        };
        Ok(ObjectId(raw))
    }
}
