//! Heap object entities.
//!
//! Provides [`Instance`], the node type of the snapshot's reference graph.
//! The four kinds of dump objects share one struct; kind-specific data lives
//! in [`InstanceKind`].

use std::sync::Arc;

use heap_types::{HeapId, InstanceId, ObjectId, StackTrace, Type};
use rustc_hash::FxHashMap;

use crate::ClassObj;

/// Kind-specific payload of an instance.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceKind {
    /// A plain class instance
    Object {
        /// Buffer offset of the field block
        fields_offset: usize,
    },
    /// An array of references
    ObjectArray {
        /// Buffer offset of the first element
        offset: usize,
        /// Number of elements
        length: u32,
    },
    /// An array of primitive values
    PrimitiveArray {
        /// Buffer offset of the first element
        offset: usize,
        /// Number of elements
        length: u32,
        /// Type of every element
        element_type: Type,
    },
    /// A class object
    Class(ClassObj),
}

impl InstanceKind {
    /// Returns a short description used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            InstanceKind::Object { .. } => "a class instance",
            InstanceKind::ObjectArray { .. } => "an object array",
            InstanceKind::PrimitiveArray { .. } => "a primitive array",
            InstanceKind::Class(_) => "a class object",
        }
    }
}

/// A node of the heap graph.
///
/// Instances are created by [`crate::SnapshotBuilder`] and owned by the
/// [`crate::Snapshot`]. They refer to each other only through [`InstanceId`].
#[derive(Debug, Clone)]
pub struct Instance {
    id: ObjectId,
    stack: Option<Arc<StackTrace>>,
    class_id: ObjectId,
    heap: Option<HeapId>,
    size: Option<u32>,
    /// Retained size per heap partition; missing entries read as zero
    retained_sizes: FxHashMap<HeapId, u64>,
    /// Instances holding a reference to this one, in discovery order
    references: Vec<InstanceId>,
    outgoing: Vec<InstanceId>,
    kind: InstanceKind,
}

impl Instance {
    pub(crate) fn new(id: ObjectId, stack: Option<Arc<StackTrace>>, kind: InstanceKind) -> Self {
        Instance {
            id,
            stack,
            class_id: ObjectId::NULL,
            heap: None,
            size: None,
            retained_sizes: FxHashMap::default(),
            references: Vec::new(),
            outgoing: Vec::new(),
            kind,
        }
    }

    /// Returns the dump identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the allocation stack trace, if the dump recorded one.
    pub fn stack(&self) -> Option<&Arc<StackTrace>> {
        self.stack.as_ref()
    }

    /// Returns the identity of the owner class.
    pub fn class_id(&self) -> ObjectId {
        self.class_id
    }

    /// Returns the owning heap partition.
    pub fn heap(&self) -> Option<HeapId> {
        self.heap
    }

    /// Returns the intrinsic size in bytes, or 0 when the loader never set it.
    pub fn size(&self) -> u32 {
        self.size.unwrap_or(0)
    }

    /// Returns the kind-specific payload.
    pub fn kind(&self) -> &InstanceKind {
        &self.kind
    }

    /// Returns the class descriptor if this instance is a class object.
    pub fn as_class(&self) -> Option<&ClassObj> {
        match &self.kind {
            InstanceKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Returns the instances that hold a reference to this one.
    pub fn references(&self) -> &[InstanceId] {
        &self.references
    }

    /// Returns the instances this one references.
    pub fn outgoing(&self) -> &[InstanceId] {
        &self.outgoing
    }

    /// Returns the retained size last computed for `heap`, or 0.
    pub fn retained_size(&self, heap: HeapId) -> u64 {
        self.retained_sizes.get(&heap).copied().unwrap_or(0)
    }

    /// Overwrites the retained size for `heap`.
    pub(crate) fn set_retained_size(&mut self, heap: HeapId, size: u64) {
        self.retained_sizes.insert(heap, size);
    }

    pub(crate) fn set_class_id(&mut self, class_id: ObjectId) {
        self.class_id = class_id;
    }

    /// Assigns the owning heap; later assignments are ignored.
    pub(crate) fn set_heap(&mut self, heap: HeapId) {
        match self.heap {
            Some(current) if current != heap => {
                tracing::warn!(id = %self.id, %current, ignored = %heap, "heap assigned twice");
            }
            Some(_) => {}
            None => self.heap = Some(heap),
        }
    }

    /// Sets the intrinsic size; later assignments are ignored.
    pub(crate) fn set_size(&mut self, size: u32) {
        match self.size {
            Some(current) if current != size => {
                tracing::warn!(id = %self.id, current, ignored = size, "intrinsic size set twice");
            }
            Some(_) => {}
            None => self.size = Some(size),
        }
    }

    /// Appends an incoming reference. Duplicate calls append duplicates.
    pub(crate) fn add_reference(&mut self, from: InstanceId) {
        self.references.push(from);
    }

    pub(crate) fn add_outgoing(&mut self, to: InstanceId) {
        self.outgoing.push(to);
    }
}
