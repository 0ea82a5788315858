//! Errors raised while loading or querying a heap snapshot.
//!
//! A reference to an identity that is not part of the snapshot is *not* an
//! error: such fields decode as a null reference. Everything that invalidates
//! size or type reasoning for an instance is reported here instead.

use crate::{HeapId, InstanceId, ObjectId};
use thiserror::Error;

/// Errors produced by the snapshot model.
///
/// # Examples
///
/// ```
/// use heap_types::{HeapError, ObjectId};
///
/// let error = HeapError::DanglingClassReference {
///     instance: ObjectId(0x10),
///     class_id: ObjectId(0x20),
/// };
/// assert_eq!(
///     error.to_string(),
///     "instance 0x00000010 refers to unknown class 0x00000020"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The owner class of an instance cannot be resolved
    #[error("instance {instance} refers to unknown class {class_id}")]
    DanglingClassReference {
        /// The instance whose class was requested
        instance: ObjectId,
        /// The class identity that failed to resolve
        class_id: ObjectId,
    },

    /// A type tag outside the known basic types
    #[error("malformed field type tag {tag}")]
    MalformedFieldType {
        /// The offending tag
        tag: u8,
    },

    /// A read ran past the end of the dump buffer
    #[error("read of {wanted} bytes at offset {offset} overruns buffer of {len} bytes")]
    BufferUnderflow {
        /// Offset the read started at
        offset: usize,
        /// Number of bytes requested
        wanted: usize,
        /// Length of the buffer
        len: usize,
    },

    /// The dump declares an identifier width other than 1, 2, 4 or 8
    #[error("unsupported identifier size {0}")]
    UnsupportedIdSize(u8),

    /// Two records in the dump claim the same identity
    #[error("duplicate object identity {0}")]
    DuplicateIdentity(ObjectId),

    /// A heap index that does not belong to this snapshot
    #[error("unknown heap {0}")]
    UnknownHeap(HeapId),

    /// An instance index that does not belong to this snapshot
    #[error("unknown instance {0}")]
    UnknownInstance(InstanceId),

    /// A class object whose descriptor names a different identity
    #[error("class object {instance} carries descriptor for class {class_id}")]
    ClassIdentityMismatch {
        /// Identity the class object was added under
        instance: ObjectId,
        /// Identity recorded in its descriptor
        class_id: ObjectId,
    },

    /// A variant-specific accessor was used on the wrong kind of instance
    #[error("instance {instance} is {found}, not {expected}")]
    WrongInstanceKind {
        /// The instance that was accessed
        instance: ObjectId,
        /// Description of the expected variant
        expected: &'static str,
        /// Description of the actual variant
        found: &'static str,
    },

    /// Decoding the fields of an instance failed
    #[error("failed to decode instance {instance}: {source}")]
    Decode {
        /// The instance being decoded
        instance: ObjectId,
        /// The underlying failure
        #[source]
        source: Box<HeapError>,
    },
}

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, HeapError>;

impl HeapError {
    /// Wraps this error with the identity of the instance being decoded.
    pub fn while_decoding(self, instance: ObjectId) -> HeapError {
        HeapError::Decode {
            instance,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through [`HeapError::Decode`].
    pub fn root_cause(&self) -> &HeapError {
        match self {
            HeapError::Decode { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
