//! Heap Graph - object graph model of a loaded heap snapshot
//!
//! This component provides:
//! - A dump-backed byte buffer with typed, byte-order aware reads
//! - Heap partitions, class descriptors and instances in one arena
//! - Two-phase loading that records reference edges in both directions
//! - Lazy decoding of field, array and static values
//! - Iterative reachability traversal with a per-walk mark table
//! - Composite and per-partition retained size accounting
//!
//! # Examples
//!
//! ```
//! use heap_graph::{HprofBuffer, InstanceKind, SnapshotBuilder};
//! use heap_types::ObjectId;
//!
//! let mut builder = SnapshotBuilder::new(HprofBuffer::empty());
//! let app = builder.add_heap(0x41, heap_graph::APP_HEAP);
//! let root = builder
//!     .add_instance(ObjectId(1), None, InstanceKind::Object { fields_offset: 0 })
//!     .unwrap();
//! let leaf = builder
//!     .add_instance(ObjectId(2), None, InstanceKind::Object { fields_offset: 0 })
//!     .unwrap();
//! for (id, size) in [(root, 16), (leaf, 8)] {
//!     builder.set_heap(id, app).unwrap();
//!     builder.set_size(id, size).unwrap();
//! }
//! builder.add_reference(root, leaf).unwrap();
//!
//! let (mut snapshot, _) = builder.build().unwrap();
//! assert_eq!(snapshot.composite_size(root).unwrap(), 24);
//! let retained = snapshot.compute_retained_sizes(root, &[app]).unwrap();
//! assert_eq!(retained.get(app), 24);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod class_obj;
pub mod config;
pub mod decoder;
pub mod heap;
pub mod instance;
pub mod retained;
pub mod snapshot;
pub mod visitor;

// Re-export main types
pub use buffer::{BufferCursor, HprofBuffer};
pub use class_obj::{ClassObj, Field, StaticField};
pub use config::SnapshotConfig;
pub use decoder::{Decoder, IdentityIndex, Reference};
pub use heap::{Heap, HeapStats, APP_HEAP, DEFAULT_HEAP, IMAGE_HEAP, ZYGOTE_HEAP};
pub use instance::{Instance, InstanceKind};
pub use retained::RetainedSizes;
pub use snapshot::{LoadStats, Snapshot, SnapshotBuilder};
pub use visitor::{closure, walk, walk_from, CollectingVisitor, MarkColor, Visitor};
