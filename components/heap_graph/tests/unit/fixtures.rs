//! Graph builders shared by the unit tests.

use heap_graph::{HprofBuffer, InstanceKind, Snapshot, SnapshotBuilder};
use heap_types::{HeapId, InstanceId, ObjectId};

/// A node description: owning partition (by position in `heaps`) and size.
#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub heap: Option<usize>,
    pub size: u32,
}

pub fn node(heap: usize, size: u32) -> Node {
    Node {
        heap: Some(heap),
        size,
    }
}

/// Builds a hand-linked snapshot without any buffer-backed edges.
pub fn build_graph(
    heaps: &[&str],
    nodes: &[Node],
    edges: &[(usize, usize)],
) -> (Snapshot, Vec<HeapId>, Vec<InstanceId>) {
    let mut builder = SnapshotBuilder::new(HprofBuffer::empty());
    let heap_ids: Vec<HeapId> = heaps
        .iter()
        .enumerate()
        .map(|(pos, name)| builder.add_heap(pos as u32, *name))
        .collect();
    let ids: Vec<InstanceId> = nodes
        .iter()
        .enumerate()
        .map(|(pos, node)| {
            let id = builder
                .add_instance(
                    ObjectId(pos as u64 + 1),
                    None,
                    InstanceKind::Object { fields_offset: 0 },
                )
                .unwrap();
            if let Some(heap) = node.heap {
                builder.set_heap(id, heap_ids[heap]).unwrap();
            }
            builder.set_size(id, node.size).unwrap();
            id
        })
        .collect();
    for &(from, to) in edges {
        builder.add_reference(ids[from], ids[to]).unwrap();
    }
    let (snapshot, _) = builder.build().unwrap();
    (snapshot, heap_ids, ids)
}

/// Encodes 4-byte big-endian identifiers.
pub fn ids_be(ids: &[u32]) -> Vec<u8> {
    ids.iter().flat_map(|id| id.to_be_bytes()).collect()
}
