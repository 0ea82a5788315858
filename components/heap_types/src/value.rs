//! Decoded field values.
//!
//! Values are produced lazily from a snapshot's byte buffer. Primitives are
//! stored inline; references are resolved to an arena index of the snapshot
//! they were read from.

use crate::{InstanceId, Type};
use std::fmt;

/// A field, array element or static value read from a heap dump.
///
/// # Examples
///
/// ```
/// use heap_types::{Type, Value};
///
/// let v = Value::Long(-1);
/// assert_eq!(v.ty(), Type::Long);
/// assert_eq!(v.to_string(), "-1");
///
/// // A reference that did not resolve to anything in the snapshot
/// let dangling = Value::Object(None);
/// assert!(dangling.is_null());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Reference to another instance, or `None` for null and unresolved targets
    Object(Option<InstanceId>),
    /// `boolean`
    Boolean(bool),
    /// `char`, kept as the raw UTF-16 code unit
    Char(u16),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `byte`
    Byte(i8),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
}

impl Value {
    /// Returns the type tag this value was decoded as.
    pub fn ty(&self) -> Type {
        match self {
            Value::Object(_) => Type::Object,
            Value::Boolean(_) => Type::Boolean,
            Value::Char(_) => Type::Char,
            Value::Float(_) => Type::Float,
            Value::Double(_) => Type::Double,
            Value::Byte(_) => Type::Byte,
            Value::Short(_) => Type::Short,
            Value::Int(_) => Type::Int,
            Value::Long(_) => Type::Long,
        }
    }

    /// Returns the referenced instance, if this is a resolved reference.
    pub fn as_instance(&self) -> Option<InstanceId> {
        match self {
            Value::Object(target) => *target,
            _ => None,
        }
    }

    /// Returns true for a reference that is null or did not resolve.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Object(None))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Object(Some(target)) => write!(f, "{}", target),
            Value::Object(None) => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Char(unit) => match char::from_u32(u32::from(*unit)) {
                Some(c) => write!(f, "'{}'", c.escape_default()),
                None => write!(f, "'\\u{{{:04x}}}'", unit),
            },
            Value::Float(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::Byte(n) => write!(f, "{}", n),
            Value::Short(n) => write!(f, "{}", n),
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
        }
    }
}
