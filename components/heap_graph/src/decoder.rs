//! Type-directed decoding of field values.
//!
//! The decoder turns a type tag and a buffer position into a [`Value`].
//! References are resolved through the snapshot's identity index; an
//! identifier with no matching instance (for example a JNI global pointing
//! outside the captured heap) decodes as a null reference.

use std::cell::Cell;

use heap_types::{InstanceId, ObjectId, Result, Type, Value};
use rustc_hash::FxHashMap;

use crate::buffer::BufferCursor;

/// Maps dump identities to arena indices.
pub type IdentityIndex = FxHashMap<ObjectId, InstanceId>;

/// Outcome of resolving a reference slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// The slot holds the null identifier
    Null,
    /// The identifier names an instance of this snapshot
    Resolved(InstanceId),
    /// The identifier names nothing in this snapshot
    Unresolved(ObjectId),
}

impl Reference {
    /// Returns the resolved target, if any.
    pub fn target(self) -> Option<InstanceId> {
        match self {
            Reference::Resolved(target) => Some(target),
            Reference::Null | Reference::Unresolved(_) => None,
        }
    }
}

/// Reads typed values against an identity index.
///
/// The decoder counts unresolved references it has seen so the load pass
/// can report them.
#[derive(Debug)]
pub struct Decoder<'a> {
    index: &'a IdentityIndex,
    unresolved: Cell<usize>,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder resolving identities through `index`.
    pub fn new(index: &'a IdentityIndex) -> Self {
        Decoder {
            index,
            unresolved: Cell::new(0),
        }
    }

    /// Returns how many unresolved references this decoder has read.
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.get()
    }

    /// Maps an identity to its arena index.
    pub fn resolve(&self, id: ObjectId) -> Reference {
        if id.is_null() {
            return Reference::Null;
        }
        match self.index.get(&id) {
            Some(&target) => Reference::Resolved(target),
            None => {
                self.unresolved.set(self.unresolved.get() + 1);
                tracing::trace!(%id, "reference to identity outside the snapshot");
                Reference::Unresolved(id)
            }
        }
    }

    /// Reads a reference slot and resolves it.
    pub fn read_reference(&self, cursor: &mut BufferCursor<'_>) -> Result<Reference> {
        let id = cursor.read_id()?;
        Ok(self.resolve(id))
    }

    /// Reads one value of type `ty`.
    ///
    /// # Errors
    ///
    /// Fails with [`heap_types::HeapError::BufferUnderflow`] when the value
    /// extends past the end of the buffer.
    pub fn read_value(&self, ty: Type, cursor: &mut BufferCursor<'_>) -> Result<Value> {
        Ok(match ty {
            Type::Object => Value::Object(self.read_reference(cursor)?.target()),
            Type::Boolean => Value::Boolean(cursor.read_u8()? != 0),
            Type::Char => Value::Char(cursor.read_u16()?),
            Type::Float => Value::Float(cursor.read_f32()?),
            Type::Double => Value::Double(cursor.read_f64()?),
            Type::Byte => Value::Byte(cursor.read_i8()?),
            Type::Short => Value::Short(cursor.read_i16()?),
            Type::Int => Value::Int(cursor.read_i32()?),
            Type::Long => Value::Long(cursor.read_i64()?),
        })
    }

    /// Reads one value whose type is given as a raw basic-type code.
    ///
    /// # Errors
    ///
    /// Fails with [`heap_types::HeapError::MalformedFieldType`] for an unknown
    /// code, without consuming any bytes.
    pub fn read_tagged(&self, tag: u8, cursor: &mut BufferCursor<'_>) -> Result<Value> {
        let ty = Type::from_tag(tag)?;
        self.read_value(ty, cursor)
    }
}
