//! Identity and arena index types.
//!
//! A dump names every object with an opaque identifier ([`ObjectId`]). Once a
//! snapshot is loaded, objects and heaps are addressed by dense arena indices
//! ([`InstanceId`], [`HeapId`]) instead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an object as recorded in the heap dump.
///
/// Identities are unique within a snapshot and never reassigned. The value
/// `0` is reserved for the null reference.
///
/// # Examples
///
/// ```
/// use heap_types::ObjectId;
///
/// let id = ObjectId(0x1234);
/// assert!(!id.is_null());
/// assert_eq!(id.to_string(), "0x00001234");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// The null reference
    pub const NULL: ObjectId = ObjectId(0);

    /// Returns true if this is the null reference.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(raw: u64) -> Self {
        ObjectId(raw)
    }
}

/// Index of an instance inside a loaded snapshot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct InstanceId(u32);

impl InstanceId {
    /// Creates an index from an arena position.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in 32 bits.
    pub fn from_index(index: usize) -> Self {
        InstanceId(u32::try_from(index).expect("instance arena exceeds u32::MAX entries"))
    }

    /// Returns the arena position.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a heap partition inside a loaded snapshot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct HeapId(u32);

impl HeapId {
    /// Creates an index from an arena position.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in 32 bits.
    pub fn from_index(index: usize) -> Self {
        HeapId(u32::try_from(index).expect("heap table exceeds u32::MAX entries"))
    }

    /// Returns the arena position.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for HeapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "heap#{}", self.0)
    }
}
