//! Per-partition retained-size accounting.
//!
//! For a root instance the ledger computes its closure once and sums the
//! intrinsic sizes of the closure's members per owning heap partition. Every
//! member is assumed to be kept alive only through the root; excluding
//! members that other live roots also reach needs a dominator computation,
//! which is not done here.
//!
//! Results are written into the root's retained-size slots. They go stale as
//! soon as edges change; nothing is recomputed incrementally.

use std::collections::BTreeMap;

use heap_types::{HeapId, InstanceId, Result};
use serde::Serialize;

use crate::visitor::{self, Visitor};
use crate::Snapshot;

/// Retained bytes per heap partition for one root.
///
/// Partitions that were requested but hold nothing of the closure are
/// present with a size of zero; any other partition reads as zero too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RetainedSizes {
    sizes: BTreeMap<HeapId, u64>,
}

impl RetainedSizes {
    /// Returns the retained size for `heap`, or 0.
    pub fn get(&self, heap: HeapId) -> u64 {
        self.sizes.get(&heap).copied().unwrap_or(0)
    }

    /// Returns the sum over all partitions.
    pub fn total(&self) -> u64 {
        self.sizes.values().sum()
    }

    /// Iterates over partitions in index order.
    pub fn iter(&self) -> impl Iterator<Item = (HeapId, u64)> + '_ {
        self.sizes.iter().map(|(&heap, &size)| (heap, size))
    }

    /// Returns the number of partitions with an entry.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Returns true if no partition has an entry.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Keys the sizes by partition name, for reports.
    ///
    /// Partitions unknown to `snapshot` are left out.
    pub fn by_name<'s>(&self, snapshot: &'s Snapshot) -> BTreeMap<&'s str, u64> {
        self.iter()
            .filter_map(|(heap, size)| Some((snapshot.heap(heap).ok()?.name(), size)))
            .collect()
    }
}

/// Sums intrinsic sizes per requested partition as instances are entered.
struct PartitionLedger {
    sizes: BTreeMap<HeapId, u64>,
}

impl PartitionLedger {
    fn new(partitions: &[HeapId]) -> Self {
        PartitionLedger {
            sizes: partitions.iter().map(|&heap| (heap, 0)).collect(),
        }
    }
}

impl Visitor for PartitionLedger {
    fn visit_enter(&mut self, snapshot: &Snapshot, instance: InstanceId) -> bool {
        if let Ok(instance) = snapshot.instance(instance) {
            if let Some(slot) = instance.heap().and_then(|heap| self.sizes.get_mut(&heap)) {
                *slot += u64::from(instance.size());
            }
        }
        true
    }
}

impl Snapshot {
    /// Computes the retained size of `root` in each of `partitions` and stores
    /// the results in the root's retained-size slots.
    ///
    /// Instances owned by a partition outside `partitions`, or by no
    /// partition at all, contribute nothing. A partition id unknown to this
    /// snapshot simply gets zero.
    ///
    /// # Errors
    ///
    /// Returns [`heap_types::HeapError::UnknownInstance`] if `root` is not
    /// part of the snapshot.
    pub fn compute_retained_sizes(
        &mut self,
        root: InstanceId,
        partitions: &[HeapId],
    ) -> Result<RetainedSizes> {
        let mut ledger = PartitionLedger::new(partitions);
        visitor::walk(self, root, &mut ledger)?;

        let instance = self.instance_mut(root)?;
        for (&heap, &size) in &ledger.sizes {
            instance.set_retained_size(heap, size);
        }
        let sizes = RetainedSizes {
            sizes: ledger.sizes,
        };
        tracing::debug!(
            %root,
            partitions = sizes.len(),
            total = sizes.total(),
            "retained sizes computed"
        );
        Ok(sizes)
    }

    /// Computes retained sizes of `root` across every declared partition.
    pub fn compute_retained_sizes_all(&mut self, root: InstanceId) -> Result<RetainedSizes> {
        let partitions = self.heap_ids();
        self.compute_retained_sizes(root, &partitions)
    }

    /// Returns the retained size last stored for `root` in `heap`, or 0.
    pub fn retained_size(&self, root: InstanceId, heap: HeapId) -> u64 {
        self.instance(root)
            .map_or(0, |instance| instance.retained_size(heap))
    }
}
