//! Snapshot Scenario Integration Tests
//!
//! Builds small hand-linked graphs across heap partitions and checks the
//! reported sizes, including the JSON form a report would emit.

use heap_graph::{
    HprofBuffer, InstanceKind, Snapshot, SnapshotBuilder, APP_HEAP, DEFAULT_HEAP, IMAGE_HEAP,
    ZYGOTE_HEAP,
};
use heap_types::{HeapId, InstanceId, ObjectId};

struct Graph {
    builder: SnapshotBuilder,
    next_id: u64,
}

impl Graph {
    fn new() -> Self {
        Graph {
            builder: SnapshotBuilder::new(HprofBuffer::empty()),
            next_id: 1,
        }
    }

    fn heap(&mut self, name: &str) -> HeapId {
        let dump_id = name.bytes().next().map_or(0, u32::from);
        self.builder.add_heap(dump_id, name)
    }

    fn object(&mut self, heap: HeapId, size: u32) -> InstanceId {
        let id = self
            .builder
            .add_instance(
                ObjectId(self.next_id),
                None,
                InstanceKind::Object { fields_offset: 0 },
            )
            .unwrap();
        self.next_id += 1;
        self.builder.set_heap(id, heap).unwrap();
        self.builder.set_size(id, size).unwrap();
        id
    }

    fn link(&mut self, from: InstanceId, to: InstanceId) {
        self.builder.add_reference(from, to).unwrap();
    }

    fn build(self) -> Snapshot {
        self.builder.build().unwrap().0
    }
}

/// Test: R(10) -> A(20) -> B(5) -> A in a single partition
#[test]
fn test_cycle_in_default_partition() {
    let mut graph = Graph::new();
    let default = graph.heap(DEFAULT_HEAP);
    let r = graph.object(default, 10);
    let a = graph.object(default, 20);
    let b = graph.object(default, 5);
    graph.link(r, a);
    graph.link(a, b);
    graph.link(b, a);
    let mut snapshot = graph.build();

    assert_eq!(snapshot.composite_size(r).unwrap(), 35);
    let sizes = snapshot.compute_retained_sizes(r, &[default]).unwrap();
    assert_eq!(
        serde_json::to_value(sizes.by_name(&snapshot)).unwrap(),
        serde_json::json!({ "default": 35 })
    );
}

/// Test: R(app, 10) -> A(image, 20)
#[test]
fn test_two_partitions() {
    let mut graph = Graph::new();
    let app = graph.heap(APP_HEAP);
    let image = graph.heap(IMAGE_HEAP);
    let r = graph.object(app, 10);
    let a = graph.object(image, 20);
    graph.link(r, a);
    let mut snapshot = graph.build();

    let sizes = snapshot.compute_retained_sizes(r, &[app, image]).unwrap();
    assert_eq!(
        serde_json::to_value(sizes.by_name(&snapshot)).unwrap(),
        serde_json::json!({ "app": 10, "image": 20 })
    );
}

/// Test: Sizes of several roots are stored independently
#[test]
fn test_per_root_slots() {
    let mut graph = Graph::new();
    let app = graph.heap(APP_HEAP);
    let zygote = graph.heap(ZYGOTE_HEAP);
    let activity = graph.object(app, 40);
    let view = graph.object(app, 24);
    let bitmap = graph.object(zygote, 1_000);
    graph.link(activity, view);
    graph.link(view, bitmap);
    graph.link(bitmap, activity);
    let mut snapshot = graph.build();

    for root in [activity, view, bitmap] {
        snapshot.compute_retained_sizes_all(root).unwrap();
    }
    for root in [activity, view, bitmap] {
        assert_eq!(snapshot.retained_size(root, app), 64);
        assert_eq!(snapshot.retained_size(root, zygote), 1_000);
    }
}

/// Test: Heap statistics and load statistics serialize for reports
#[test]
fn test_stats_reports() {
    let mut graph = Graph::new();
    let app = graph.heap(APP_HEAP);
    let image = graph.heap(IMAGE_HEAP);
    let r = graph.object(app, 8);
    let a = graph.object(app, 8);
    graph.object(image, 100);
    graph.link(r, a);
    let (snapshot, stats) = graph.builder.build().unwrap();

    assert_eq!(
        serde_json::to_value(stats).unwrap(),
        serde_json::json!({
            "instances": 3,
            "classes": 0,
            "decoded_edges": 0,
            "dangling_references": 0
        })
    );
    assert_eq!(
        serde_json::to_value(snapshot.heap_stats(app)).unwrap(),
        serde_json::json!({ "instance_count": 2, "shallow_size": 16 })
    );
    assert_eq!(snapshot.heap_stats(image).shallow_size, 100);
}

/// Test: Traversal crosses partitions but only outgoing edges
#[test]
fn test_closure_direction() {
    let mut graph = Graph::new();
    let app = graph.heap(APP_HEAP);
    let image = graph.heap(IMAGE_HEAP);
    let holder = graph.object(app, 16);
    let shared = graph.object(image, 32);
    let other = graph.object(app, 8);
    graph.link(holder, shared);
    graph.link(other, shared);
    let snapshot = graph.build();

    let mut closure = heap_graph::closure(&snapshot, holder).unwrap();
    closure.sort();
    assert_eq!(closure, vec![holder, shared]);
    assert_eq!(snapshot.references(shared), &[holder, other]);
    assert_eq!(snapshot.composite_size(shared).unwrap(), 32);
}
