//! Class descriptors.
//!
//! A class descriptor records the layout of its instances' field blocks and
//! where its own static values live in the dump buffer. Instances store their
//! fields as one block ordered from the most derived class up to the root of
//! the hierarchy; [`crate::Snapshot::field_layout`] rebuilds that order.

use heap_types::{ObjectId, Type};

/// A named, typed slot of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Name of the field
    pub name: String,
    /// Type tag of the field
    pub ty: Type,
}

impl Field {
    /// Creates a field descriptor.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Field {
            name: name.into(),
            ty,
        }
    }
}

/// A static field together with the buffer offset of its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticField {
    /// Name and type of the static
    pub field: Field,
    /// Offset of the value in the dump buffer
    pub offset: usize,
}

/// Descriptor of a class loaded from the dump.
///
/// # Example
///
/// ```
/// use heap_graph::ClassObj;
/// use heap_types::{ObjectId, Type};
///
/// let class = ClassObj::new(ObjectId(0x100), "com.example.Node")
///     .with_super(ObjectId(0x50))
///     .with_field("next", Type::Object)
///     .with_field("value", Type::Int);
///
/// assert_eq!(class.fields().len(), 2);
/// assert_eq!(class.field_index("value"), Some(1));
/// assert_eq!(class.super_class_id(), ObjectId(0x50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassObj {
    id: ObjectId,
    name: String,
    super_class_id: ObjectId,
    instance_size: u32,
    fields: Vec<Field>,
    static_fields: Vec<StaticField>,
}

impl ClassObj {
    /// Creates a class with no superclass and no fields.
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        ClassObj {
            id,
            name: name.into(),
            super_class_id: ObjectId::NULL,
            instance_size: 0,
            fields: Vec::new(),
            static_fields: Vec::new(),
        }
    }

    /// Sets the superclass identity.
    pub fn with_super(mut self, super_class_id: ObjectId) -> Self {
        self.super_class_id = super_class_id;
        self
    }

    /// Sets the size the dump declares for instances of this class.
    pub fn with_instance_size(mut self, instance_size: u32) -> Self {
        self.instance_size = instance_size;
        self
    }

    /// Appends an instance field declared by this class.
    pub fn with_field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(Field::new(name, ty));
        self
    }

    /// Appends a static field whose value is stored at `offset`.
    pub fn with_static_field(mut self, name: impl Into<String>, ty: Type, offset: usize) -> Self {
        self.static_fields.push(StaticField {
            field: Field::new(name, ty),
            offset,
        });
        self
    }

    /// Returns the class identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the fully qualified class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the superclass identity, or [`ObjectId::NULL`] for a root class.
    pub fn super_class_id(&self) -> ObjectId {
        self.super_class_id
    }

    /// Returns the declared instance size in bytes.
    pub fn instance_size(&self) -> u32 {
        self.instance_size
    }

    /// Returns the instance fields declared by this class only.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the static fields of this class.
    pub fn static_fields(&self) -> &[StaticField] {
        &self.static_fields
    }

    /// Returns the position of a declared field.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns true for array classes such as `java.lang.Object[]`.
    pub fn is_array_class(&self) -> bool {
        self.name.ends_with("[]")
    }
}
