//! Reachability traversal over the reference graph.
//!
//! The walk is depth-first and iterative: an explicit frame stack replaces
//! recursion, so arbitrarily long reference chains cannot overflow the call
//! stack. Each traversal keeps its own tri-color mark table:
//!
//! - **White**: not reached yet
//! - **Gray**: entered, children still being explored
//! - **Black**: left, every explored child has been left as well
//!
//! An instance is entered at most once per traversal. This is what makes the
//! walk terminate on cycles and count diamond-shaped sharing once.

use heap_types::{InstanceId, Result};

use crate::Snapshot;

/// Mark colors for tri-color traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MarkColor {
    /// Unmarked (not yet visited)
    White = 0,
    /// Entered, children not yet fully explored
    Gray = 1,
    /// Fully processed
    Black = 2,
}

/// Callbacks invoked by [`walk`].
///
/// A closure `FnMut(&Snapshot, InstanceId) -> bool` is a visitor with a
/// no-op `visit_leave`.
pub trait Visitor {
    /// Called the first time the traversal reaches `instance`.
    ///
    /// Returning `false` skips the instance's children; `visit_leave` is then
    /// not called for it.
    fn visit_enter(&mut self, snapshot: &Snapshot, instance: InstanceId) -> bool;

    /// Called once every child of an entered instance has been explored.
    fn visit_leave(&mut self, _snapshot: &Snapshot, _instance: InstanceId) {}
}

impl<F> Visitor for F
where
    F: FnMut(&Snapshot, InstanceId) -> bool,
{
    fn visit_enter(&mut self, snapshot: &Snapshot, instance: InstanceId) -> bool {
        self(snapshot, instance)
    }
}

/// Collects every instance reached, in first-visit order.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    visited: Vec<InstanceId>,
}

impl CollectingVisitor {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the instances reached so far.
    pub fn visited(&self) -> &[InstanceId] {
        &self.visited
    }

    /// Consumes the collector, returning the reached instances.
    pub fn into_visited(self) -> Vec<InstanceId> {
        self.visited
    }
}

impl Visitor for CollectingVisitor {
    fn visit_enter(&mut self, _snapshot: &Snapshot, instance: InstanceId) -> bool {
        self.visited.push(instance);
        true
    }
}

/// Per-traversal mark table, one entry per instance of the snapshot.
struct MarkTable {
    colors: Vec<MarkColor>,
}

impl MarkTable {
    fn new(len: usize) -> Self {
        MarkTable {
            colors: vec![MarkColor::White; len],
        }
    }

    /// Marks `id` gray; returns false if it was already reached.
    fn shade(&mut self, id: InstanceId) -> bool {
        match self.colors.get_mut(id.index()) {
            Some(color @ MarkColor::White) => {
                *color = MarkColor::Gray;
                true
            }
            _ => false,
        }
    }

    fn blacken(&mut self, id: InstanceId) {
        if let Some(color) = self.colors.get_mut(id.index()) {
            *color = MarkColor::Black;
        }
    }
}

struct Frame {
    instance: InstanceId,
    next_edge: usize,
}

impl Frame {
    fn new(instance: InstanceId) -> Self {
        Frame {
            instance,
            next_edge: 0,
        }
    }
}

/// Walks everything reachable from `root`.
///
/// # Errors
///
/// Returns [`heap_types::HeapError::UnknownInstance`] if `root` is not part
/// of the snapshot.
pub fn walk<V>(snapshot: &Snapshot, root: InstanceId, visitor: &mut V) -> Result<()>
where
    V: Visitor + ?Sized,
{
    walk_from(snapshot, [root], visitor)
}

/// Walks everything reachable from any of `roots`, sharing one mark table.
///
/// A root already reached from an earlier root is not entered again.
///
/// # Errors
///
/// Returns [`heap_types::HeapError::UnknownInstance`] for the first root
/// that is not part of the snapshot; roots before it have been walked.
pub fn walk_from<V, I>(snapshot: &Snapshot, roots: I, visitor: &mut V) -> Result<()>
where
    V: Visitor + ?Sized,
    I: IntoIterator<Item = InstanceId>,
{
    let mut marks = MarkTable::new(snapshot.len());
    let mut stack: Vec<Frame> = Vec::new();
    let mut entered = 0usize;

    for root in roots {
        snapshot.instance(root)?;
        if !marks.shade(root) {
            continue;
        }
        entered += 1;
        if !visitor.visit_enter(snapshot, root) {
            continue;
        }
        stack.push(Frame::new(root));

        while let Some(frame) = stack.last_mut() {
            let current = frame.instance;
            match snapshot.outgoing(current).get(frame.next_edge) {
                Some(&child) => {
                    frame.next_edge += 1;
                    if marks.shade(child) {
                        entered += 1;
                        if visitor.visit_enter(snapshot, child) {
                            stack.push(Frame::new(child));
                        }
                    }
                }
                None => {
                    stack.pop();
                    marks.blacken(current);
                    visitor.visit_leave(snapshot, current);
                }
            }
        }
    }

    tracing::trace!(entered, "traversal complete");
    Ok(())
}

/// Returns the closure of `root`: `root` and every instance reachable from it.
///
/// The order is first-visit order and carries no meaning.
pub fn closure(snapshot: &Snapshot, root: InstanceId) -> Result<Vec<InstanceId>> {
    let mut collector = CollectingVisitor::new();
    walk(snapshot, root, &mut collector)?;
    Ok(collector.into_visited())
}
