//! Tests for reachability traversal and composite size.

use heap_graph::{closure, walk, walk_from, CollectingVisitor, Snapshot, Visitor, DEFAULT_HEAP};
use heap_types::{HeapError, InstanceId};

use crate::fixtures::{build_graph, node};

fn sorted(mut ids: Vec<InstanceId>) -> Vec<InstanceId> {
    ids.sort();
    ids
}

#[test]
fn test_composite_size_with_cycle() {
    // R(10) -> A(20) -> B(5) -> A
    let (snapshot, _, ids) = build_graph(
        &[DEFAULT_HEAP],
        &[node(0, 10), node(0, 20), node(0, 5)],
        &[(0, 1), (1, 2), (2, 1)],
    );
    assert_eq!(snapshot.composite_size(ids[0]).unwrap(), 35);
    assert_eq!(snapshot.composite_size(ids[1]).unwrap(), 25);
    assert_eq!(snapshot.composite_size(ids[2]).unwrap(), 25);
}

#[test]
fn test_composite_size_counts_shared_once() {
    // diamond: R -> A, R -> B, A -> C, B -> C
    let (snapshot, _, ids) = build_graph(
        &[DEFAULT_HEAP],
        &[node(0, 1), node(0, 2), node(0, 4), node(0, 8)],
        &[(0, 1), (0, 2), (1, 3), (2, 3)],
    );
    assert_eq!(snapshot.composite_size(ids[0]).unwrap(), 15);
}

#[test]
fn test_duplicate_edges_do_not_double_count() {
    let (snapshot, _, ids) = build_graph(
        &[DEFAULT_HEAP],
        &[node(0, 3), node(0, 4)],
        &[(0, 1), (0, 1)],
    );
    assert_eq!(snapshot.outgoing(ids[0]).len(), 2);
    assert_eq!(snapshot.references(ids[1]), &[ids[0], ids[0]]);
    assert_eq!(snapshot.composite_size(ids[0]).unwrap(), 7);
}

#[test]
fn test_closure_is_repeatable() {
    let (snapshot, _, ids) = build_graph(
        &[DEFAULT_HEAP],
        &[node(0, 1), node(0, 1), node(0, 1)],
        &[(0, 1), (1, 2), (2, 0)],
    );
    let first = sorted(closure(&snapshot, ids[0]).unwrap());
    let second = sorted(closure(&snapshot, ids[0]).unwrap());
    assert_eq!(first, second);
    assert_eq!(first, ids);
}

#[test]
fn test_traversal_follows_outgoing_only() {
    // B -> A; walking from A must not reach B
    let (snapshot, _, ids) = build_graph(&[DEFAULT_HEAP], &[node(0, 1), node(0, 1)], &[(1, 0)]);
    assert_eq!(closure(&snapshot, ids[0]).unwrap(), vec![ids[0]]);
    assert_eq!(sorted(closure(&snapshot, ids[1]).unwrap()), ids);
}

#[test]
fn test_visitor_sees_snapshot() {
    struct SizeSum(u64);
    impl Visitor for SizeSum {
        fn visit_enter(&mut self, snapshot: &Snapshot, id: InstanceId) -> bool {
            self.0 += u64::from(snapshot.instance(id).map_or(0, |i| i.size()));
            true
        }
    }

    let (snapshot, _, ids) = build_graph(
        &[DEFAULT_HEAP],
        &[node(0, 6), node(0, 7)],
        &[(0, 1)],
    );
    let mut sum = SizeSum(0);
    walk(&snapshot, ids[0], &mut sum).unwrap();
    assert_eq!(sum.0, 13);
}

#[test]
fn test_walk_from_multiple_roots() {
    let (snapshot, _, ids) = build_graph(
        &[DEFAULT_HEAP],
        &[node(0, 1), node(0, 1), node(0, 1), node(0, 1)],
        &[(0, 1), (2, 1)],
    );
    let mut collector = CollectingVisitor::new();
    walk_from(&snapshot, [ids[0], ids[2]], &mut collector).unwrap();
    assert_eq!(collector.visited().len(), 3);
    assert!(!collector.visited().contains(&ids[3]));
}

#[test]
fn test_unknown_root() {
    let (snapshot, _, _) = build_graph(&[DEFAULT_HEAP], &[node(0, 1)], &[]);
    let missing = InstanceId::from_index(1);
    assert_eq!(closure(&snapshot, missing), Err(HeapError::UnknownInstance(missing)));
}
