//! Logical heap partitions.
//!
//! A dump splits the managed heap into named partitions (the boot image, the
//! zygote, the application heap, ...). Every instance belongs to exactly one
//! of them, and retained sizes are accounted per partition.

use serde::Serialize;

/// Name of the partition used when a dump does not declare any
pub const DEFAULT_HEAP: &str = "default";
/// Name of the boot image partition
pub const IMAGE_HEAP: &str = "image";
/// Name of the application partition
pub const APP_HEAP: &str = "app";
/// Name of the zygote partition
pub const ZYGOTE_HEAP: &str = "zygote";

/// A heap partition declared by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heap {
    dump_id: u32,
    name: String,
}

impl Heap {
    pub(crate) fn new(dump_id: u32, name: impl Into<String>) -> Self {
        Heap {
            dump_id,
            name: name.into(),
        }
    }

    /// Returns the numeric id the dump uses for this partition.
    pub fn dump_id(&self) -> u32 {
        self.dump_id
    }

    /// Returns the partition name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Shallow statistics of one partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeapStats {
    /// Number of instances owned by the partition
    pub instance_count: usize,
    /// Sum of the intrinsic sizes of those instances
    pub shallow_size: u64,
}

impl HeapStats {
    pub(crate) fn record(&mut self, size: u32) {
        self.instance_count += 1;
        self.shallow_size += u64::from(size);
    }
}
