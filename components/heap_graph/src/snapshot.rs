//! Snapshot context and two-phase loading.
//!
//! A loader drives [`SnapshotBuilder`] in two phases:
//!
//! 1. Allocation: every heap, stack trace, class and instance is added with
//!    its identity, owning heap and intrinsic size. This populates the
//!    identity index.
//! 2. Edge recording: [`SnapshotBuilder::build`] decodes every reference slot
//!    of every instance, resolves it through the now complete index and
//!    appends one edge per resolved slot. Unresolved slots record nothing.
//!
//! The resulting [`Snapshot`] owns all entities. They are dropped together.

use std::sync::Arc;

use heap_types::{HeapError, HeapId, InstanceId, ObjectId, Result, StackTrace, Type, Value};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::decoder::{Decoder, IdentityIndex};
use crate::visitor;
use crate::{ClassObj, Field, Heap, HeapStats, HprofBuffer, Instance, InstanceKind};

/// Counters reported at the end of a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Number of instances, class objects included
    pub instances: usize,
    /// Number of class objects
    pub classes: usize,
    /// Number of edges recorded by decoding reference slots
    pub decoded_edges: usize,
    /// Number of reference slots naming an identity outside the snapshot
    pub dangling_references: usize,
}

/// A loaded heap snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    buffer: HprofBuffer,
    heaps: Vec<Heap>,
    instances: Vec<Instance>,
    index: IdentityIndex,
    classes: FxHashMap<ObjectId, InstanceId>,
    stack_traces: FxHashMap<u32, Arc<StackTrace>>,
}

impl Snapshot {
    fn empty(buffer: HprofBuffer) -> Self {
        Snapshot {
            buffer,
            heaps: Vec::new(),
            instances: Vec::new(),
            index: IdentityIndex::default(),
            classes: FxHashMap::default(),
            stack_traces: FxHashMap::default(),
        }
    }

    /// Returns the backing dump buffer.
    pub fn buffer(&self) -> &HprofBuffer {
        &self.buffer
    }

    /// Returns the number of instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if the snapshot holds no instances.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Returns an instance by arena index.
    pub fn instance(&self, id: InstanceId) -> Result<&Instance> {
        self.instances
            .get(id.index())
            .ok_or(HeapError::UnknownInstance(id))
    }

    pub(crate) fn instance_mut(&mut self, id: InstanceId) -> Result<&mut Instance> {
        self.instances
            .get_mut(id.index())
            .ok_or(HeapError::UnknownInstance(id))
    }

    /// Iterates over all instances in load order.
    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> + '_ {
        self.instances
            .iter()
            .enumerate()
            .map(|(pos, instance)| (InstanceId::from_index(pos), instance))
    }

    /// Looks up an instance by dump identity.
    pub fn find_instance(&self, id: ObjectId) -> Option<InstanceId> {
        self.index.get(&id).copied()
    }

    /// Looks up a class descriptor by class identity.
    pub fn find_class(&self, class_id: ObjectId) -> Option<&ClassObj> {
        let id = self.classes.get(&class_id)?;
        self.instances.get(id.index())?.as_class()
    }

    /// Iterates over all class descriptors.
    pub fn classes(&self) -> impl Iterator<Item = &ClassObj> + '_ {
        self.classes
            .values()
            .filter_map(|id| self.instances.get(id.index()))
            .filter_map(Instance::as_class)
    }

    /// Returns the instances whose owner class is `class_id`, in load order.
    pub fn instances_of(&self, class_id: ObjectId) -> Vec<InstanceId> {
        self.instances()
            .filter(|(_, instance)| instance.class_id() == class_id)
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns all heap partitions in declaration order.
    pub fn heaps(&self) -> impl Iterator<Item = (HeapId, &Heap)> + '_ {
        self.heaps
            .iter()
            .enumerate()
            .map(|(pos, heap)| (HeapId::from_index(pos), heap))
    }

    /// Returns the ids of all heap partitions.
    pub fn heap_ids(&self) -> Vec<HeapId> {
        (0..self.heaps.len()).map(HeapId::from_index).collect()
    }

    /// Returns a heap partition by index.
    pub fn heap(&self, id: HeapId) -> Result<&Heap> {
        self.heaps.get(id.index()).ok_or(HeapError::UnknownHeap(id))
    }

    /// Looks up a heap partition by name.
    pub fn find_heap(&self, name: &str) -> Option<HeapId> {
        self.heaps
            .iter()
            .position(|heap| heap.name() == name)
            .map(HeapId::from_index)
    }

    /// Returns instance count and shallow size of one partition.
    pub fn heap_stats(&self, heap: HeapId) -> HeapStats {
        let mut stats = HeapStats::default();
        for instance in self.instances.iter().filter(|i| i.heap() == Some(heap)) {
            stats.record(instance.size());
        }
        stats
    }

    /// Returns a stack trace by serial number.
    pub fn stack_trace(&self, serial: u32) -> Option<&Arc<StackTrace>> {
        self.stack_traces.get(&serial)
    }

    /// Returns the instances holding a reference to `id`, in discovery order.
    ///
    /// Unknown indices have no references.
    pub fn references(&self, id: InstanceId) -> &[InstanceId] {
        self.instances
            .get(id.index())
            .map_or(&[][..], Instance::references)
    }

    /// Returns the instances `id` references.
    ///
    /// Unknown indices have no edges.
    pub fn outgoing(&self, id: InstanceId) -> &[InstanceId] {
        self.instances
            .get(id.index())
            .map_or(&[][..], Instance::outgoing)
    }

    /// Resolves the owner class of an instance.
    ///
    /// # Errors
    ///
    /// Returns [`HeapError::DanglingClassReference`] when the instance has no
    /// owning heap or its class identity is not a loaded class.
    pub fn resolve_owner_class(&self, id: InstanceId) -> Result<&ClassObj> {
        let instance = self.instance(id)?;
        let dangling = || HeapError::DanglingClassReference {
            instance: instance.id(),
            class_id: instance.class_id(),
        };
        instance.heap().ok_or_else(dangling)?;
        self.find_class(instance.class_id()).ok_or_else(dangling)
    }

    /// Returns the fields of an instance of `class_id` in buffer order:
    /// the class's own fields first, then each superclass in turn.
    ///
    /// # Errors
    ///
    /// Returns [`HeapError::DanglingClassReference`] if the class or any of
    /// its superclasses is not loaded.
    pub fn field_layout(&self, class_id: ObjectId) -> Result<Vec<&Field>> {
        let mut layout = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = class_id;
        while !current.is_null() {
            if !seen.insert(current) {
                tracing::warn!(%class_id, at = %current, "cyclic superclass chain");
                break;
            }
            let class = self
                .find_class(current)
                .ok_or(HeapError::DanglingClassReference {
                    instance: class_id,
                    class_id: current,
                })?;
            layout.extend(class.fields());
            current = class.super_class_id();
        }
        Ok(layout)
    }

    fn object_layout(&self, instance: &Instance) -> Result<Vec<&Field>> {
        if instance.class_id().is_null() {
            return Err(HeapError::DanglingClassReference {
                instance: instance.id(),
                class_id: instance.class_id(),
            });
        }
        self.field_layout(instance.class_id()).map_err(|e| match e {
            HeapError::DanglingClassReference { class_id, .. } => {
                HeapError::DanglingClassReference {
                    instance: instance.id(),
                    class_id,
                }
            }
            other => other,
        })
    }

    /// Decodes the fields of a class instance.
    ///
    /// Reading never records edges.
    pub fn field_values(&self, id: InstanceId) -> Result<Vec<(&Field, Value)>> {
        let instance = self.instance(id)?;
        let InstanceKind::Object { fields_offset } = instance.kind() else {
            return Err(wrong_kind(instance, "a class instance"));
        };
        let layout = self.object_layout(instance)?;
        let decoder = Decoder::new(&self.index);
        let mut cursor = self.buffer.cursor(*fields_offset);
        layout
            .into_iter()
            .map(|field| {
                decoder
                    .read_value(field.ty, &mut cursor)
                    .map(|value| (field, value))
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.while_decoding(instance.id()))
    }

    /// Decodes a single named field of a class instance.
    ///
    /// When a subclass shadows a superclass field, the subclass field wins.
    pub fn field_value(&self, id: InstanceId, name: &str) -> Result<Option<Value>> {
        Ok(self
            .field_values(id)?
            .into_iter()
            .find(|(field, _)| field.name == name)
            .map(|(_, value)| value))
    }

    /// Decodes the elements of an object or primitive array.
    pub fn array_values(&self, id: InstanceId) -> Result<Vec<Value>> {
        let instance = self.instance(id)?;
        let (offset, length, ty) = match instance.kind() {
            InstanceKind::ObjectArray { offset, length } => {
                (*offset, *length, Type::Object)
            }
            InstanceKind::PrimitiveArray {
                offset,
                length,
                element_type,
            } => (*offset, *length, *element_type),
            _ => return Err(wrong_kind(instance, "an array")),
        };
        let decoder = Decoder::new(&self.index);
        let mut cursor = self.buffer.cursor(offset);
        (0..length)
            .map(|_| decoder.read_value(ty, &mut cursor))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.while_decoding(instance.id()))
    }

    /// Decodes the static fields of a class object.
    pub fn static_values(&self, id: InstanceId) -> Result<Vec<(&Field, Value)>> {
        let instance = self.instance(id)?;
        let class = instance
            .as_class()
            .ok_or_else(|| wrong_kind(instance, "a class object"))?;
        let decoder = Decoder::new(&self.index);
        class
            .static_fields()
            .iter()
            .map(|st| {
                let mut cursor = self.buffer.cursor(st.offset);
                decoder
                    .read_value(st.field.ty, &mut cursor)
                    .map(|value| (&st.field, value))
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.while_decoding(instance.id()))
    }

    /// Returns the sum of intrinsic sizes over the closure of `root`.
    ///
    /// Every reachable instance is counted once, however many paths lead to
    /// it; cycles terminate.
    pub fn composite_size(&self, root: InstanceId) -> Result<u64> {
        let closure = visitor::closure(self, root)?;
        Ok(closure
            .into_iter()
            .filter_map(|id| self.instances.get(id.index()))
            .map(|instance| u64::from(instance.size()))
            .sum())
    }

    /// Feeds the target of every resolved reference slot of `instance` to `sink`.
    fn reference_slots(
        &self,
        instance: &Instance,
        decoder: &Decoder<'_>,
        mut sink: impl FnMut(InstanceId),
    ) -> Result<()> {
        let id_size = self.buffer.id_size();
        match instance.kind() {
            // Nothing to decode until the loader assigns a class.
            InstanceKind::Object { .. } if instance.class_id().is_null() => {}
            InstanceKind::Object { fields_offset } => {
                let mut cursor = self.buffer.cursor(*fields_offset);
                for field in self.object_layout(instance)? {
                    if !field.ty.is_reference() {
                        cursor.skip(field.ty.size(id_size))?;
                    } else if let Some(to) = decoder.read_reference(&mut cursor)?.target() {
                        sink(to);
                    }
                }
            }
            InstanceKind::ObjectArray { offset, length } => {
                let mut cursor = self.buffer.cursor(*offset);
                for _ in 0..*length {
                    if let Some(to) = decoder.read_reference(&mut cursor)?.target() {
                        sink(to);
                    }
                }
            }
            InstanceKind::PrimitiveArray { .. } => {}
            InstanceKind::Class(class) => {
                for st in class.static_fields().iter().filter(|st| st.field.ty.is_reference()) {
                    let mut cursor = self.buffer.cursor(st.offset);
                    if let Some(to) = decoder.read_reference(&mut cursor)?.target() {
                        sink(to);
                    }
                }
            }
        }
        Ok(())
    }

    /// Phase 2 of loading: decode reference slots and record edges.
    fn record_references(&mut self) -> Result<(usize, usize)> {
        let decoder = Decoder::new(&self.index);
        let mut edges = Vec::new();
        for (pos, instance) in self.instances.iter().enumerate() {
            let from = InstanceId::from_index(pos);
            self.reference_slots(instance, &decoder, |to| edges.push((from, to)))
                .map_err(|e| e.while_decoding(instance.id()))?;
        }
        let dangling = decoder.unresolved_count();

        let decoded = edges.len();
        for (from, to) in edges {
            self.link(from, to);
        }
        Ok((decoded, dangling))
    }

    /// Records the edge `from -> to` on both endpoints. Indices must be valid.
    fn link(&mut self, from: InstanceId, to: InstanceId) {
        self.instances[to.index()].add_reference(from);
        self.instances[from.index()].add_outgoing(to);
    }
}

fn wrong_kind(instance: &Instance, expected: &'static str) -> HeapError {
    HeapError::WrongInstanceKind {
        instance: instance.id(),
        expected,
        found: instance.kind().describe(),
    }
}

/// Loader-facing construction of a [`Snapshot`].
///
/// # Example
///
/// ```
/// use heap_graph::{InstanceKind, SnapshotBuilder, HprofBuffer};
/// use heap_types::ObjectId;
///
/// let mut builder = SnapshotBuilder::new(HprofBuffer::empty());
/// let app = builder.add_heap(0x41, "app");
/// let root = builder
///     .add_instance(ObjectId(1), None, InstanceKind::PrimitiveArray {
///         offset: 0,
///         length: 0,
///         element_type: heap_types::Type::Byte,
///     })
///     .unwrap();
/// builder.set_heap(root, app).unwrap();
/// builder.set_size(root, 16).unwrap();
///
/// let (snapshot, stats) = builder.build().unwrap();
/// assert_eq!(stats.instances, 1);
/// assert_eq!(snapshot.composite_size(root).unwrap(), 16);
/// ```
#[derive(Debug)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    /// Starts a snapshot over the given dump bytes.
    pub fn new(buffer: HprofBuffer) -> Self {
        SnapshotBuilder {
            snapshot: Snapshot::empty(buffer),
        }
    }

    /// Declares a heap partition.
    pub fn add_heap(&mut self, dump_id: u32, name: impl Into<String>) -> HeapId {
        let id = HeapId::from_index(self.snapshot.heaps.len());
        self.snapshot.heaps.push(Heap::new(dump_id, name));
        id
    }

    /// Registers a stack trace under its serial number.
    ///
    /// A later trace with the same serial replaces the earlier one for
    /// instances added afterwards.
    pub fn add_stack_trace(&mut self, trace: StackTrace) -> Arc<StackTrace> {
        let trace = Arc::new(trace);
        self.snapshot
            .stack_traces
            .insert(trace.serial, Arc::clone(&trace));
        trace
    }

    /// Returns a registered stack trace.
    pub fn stack_trace(&self, serial: u32) -> Option<Arc<StackTrace>> {
        self.snapshot.stack_traces.get(&serial).cloned()
    }

    /// Adds an instance.
    ///
    /// Class objects are also registered in the class table under their
    /// identity.
    ///
    /// # Errors
    ///
    /// Returns [`HeapError::DuplicateIdentity`] if `id` was already added,
    /// or if a class object's descriptor names a class that is already
    /// registered. Returns [`HeapError::ClassIdentityMismatch`] for a class
    /// object whose descriptor identity differs from `id`.
    pub fn add_instance(
        &mut self,
        id: ObjectId,
        stack: Option<Arc<StackTrace>>,
        kind: InstanceKind,
    ) -> Result<InstanceId> {
        let snapshot = &mut self.snapshot;
        if snapshot.index.contains_key(&id) {
            return Err(HeapError::DuplicateIdentity(id));
        }
        let position = InstanceId::from_index(snapshot.instances.len());
        if let InstanceKind::Class(class) = &kind {
            if class.id() != id {
                return Err(HeapError::ClassIdentityMismatch {
                    instance: id,
                    class_id: class.id(),
                });
            }
            if snapshot.classes.contains_key(&id) {
                return Err(HeapError::DuplicateIdentity(id));
            }
            snapshot.classes.insert(id, position);
        }
        snapshot.instances.push(Instance::new(id, stack, kind));
        snapshot.index.insert(id, position);
        Ok(position)
    }

    /// Adds a class object. Its identity is the class's identity.
    pub fn add_class(
        &mut self,
        class: ClassObj,
        stack: Option<Arc<StackTrace>>,
    ) -> Result<InstanceId> {
        self.add_instance(class.id(), stack, InstanceKind::Class(class))
    }

    /// Sets the owner class identity of an instance.
    ///
    /// The class does not need to be loaded yet; it is resolved lazily.
    pub fn set_class_id(&mut self, instance: InstanceId, class_id: ObjectId) -> Result<()> {
        self.snapshot.instance_mut(instance)?.set_class_id(class_id);
        Ok(())
    }

    /// Assigns the owning heap partition of an instance.
    pub fn set_heap(&mut self, instance: InstanceId, heap: HeapId) -> Result<()> {
        self.snapshot.heap(heap)?;
        self.snapshot.instance_mut(instance)?.set_heap(heap);
        Ok(())
    }

    /// Sets the intrinsic size of an instance.
    pub fn set_size(&mut self, instance: InstanceId, size: u32) -> Result<()> {
        self.snapshot.instance_mut(instance)?.set_size(size);
        Ok(())
    }

    /// Records that `from` holds a reference to `to`.
    ///
    /// Calling this twice for the same pair records the edge twice. Edges
    /// decoded from the buffer during [`SnapshotBuilder::build`] are added
    /// on top of the ones recorded here.
    pub fn add_reference(&mut self, from: InstanceId, to: InstanceId) -> Result<()> {
        self.snapshot.instance(from)?;
        self.snapshot.instance(to)?;
        self.snapshot.link(from, to);
        Ok(())
    }

    /// Looks up an instance added so far.
    pub fn find_instance(&self, id: ObjectId) -> Option<InstanceId> {
        self.snapshot.find_instance(id)
    }

    /// Decodes every reference slot and returns the finished snapshot.
    ///
    /// # Errors
    ///
    /// Fails with [`HeapError::Decode`] naming the first instance whose
    /// slots could not be decoded: a missing class, a malformed type or a
    /// field block running past the end of the buffer.
    pub fn build(mut self) -> Result<(Snapshot, LoadStats)> {
        let snapshot = &mut self.snapshot;
        tracing::debug!(
            instances = snapshot.instances.len(),
            classes = snapshot.classes.len(),
            heaps = snapshot.heaps.len(),
            "allocation phase complete"
        );

        let (decoded_edges, dangling_references) = snapshot.record_references()?;
        let stats = LoadStats {
            instances: snapshot.instances.len(),
            classes: snapshot.classes.len(),
            decoded_edges,
            dangling_references,
        };
        tracing::debug!(
            decoded_edges,
            dangling_references,
            "edge recording phase complete"
        );
        Ok((self.snapshot, stats))
    }
}
