//! Field type tags and buffer layout parameters.

use crate::{HeapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Basic type of a field, array element or static value.
///
/// The discriminants are the basic-type codes written by HPROF dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Type {
    /// Reference to another object
    Object = 2,
    /// `boolean`, one byte
    Boolean = 4,
    /// `char`, a UTF-16 code unit
    Char = 5,
    /// `float`
    Float = 6,
    /// `double`
    Double = 7,
    /// `byte`
    Byte = 8,
    /// `short`
    Short = 9,
    /// `int`
    Int = 10,
    /// `long`
    Long = 11,
}

impl Type {
    /// Decodes a basic-type code.
    ///
    /// # Errors
    ///
    /// Returns [`HeapError::MalformedFieldType`] for an unknown code.
    ///
    /// # Examples
    ///
    /// ```
    /// use heap_types::{HeapError, Type};
    ///
    /// assert_eq!(Type::from_tag(2).unwrap(), Type::Object);
    /// assert_eq!(Type::from_tag(3), Err(HeapError::MalformedFieldType { tag: 3 }));
    /// ```
    pub fn from_tag(tag: u8) -> Result<Type> {
        Ok(match tag {
            2 => Type::Object,
            4 => Type::Boolean,
            5 => Type::Char,
            6 => Type::Float,
            7 => Type::Double,
            8 => Type::Byte,
            9 => Type::Short,
            10 => Type::Int,
            11 => Type::Long,
            _ => return Err(HeapError::MalformedFieldType { tag }),
        })
    }

    /// Returns the basic-type code.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Returns the number of bytes a value of this type occupies in the dump.
    ///
    /// References are as wide as the dump's identifiers.
    pub fn size(self, id_size: IdSize) -> usize {
        match self {
            Type::Object => id_size.bytes(),
            Type::Boolean | Type::Byte => 1,
            Type::Char | Type::Short => 2,
            Type::Float | Type::Int => 4,
            Type::Double | Type::Long => 8,
        }
    }

    /// Returns true for [`Type::Object`].
    pub fn is_reference(self) -> bool {
        self == Type::Object
    }

    /// Returns the Java spelling of this type.
    pub fn name(self) -> &'static str {
        match self {
            Type::Object => "Object",
            Type::Boolean => "boolean",
            Type::Char => "char",
            Type::Float => "float",
            Type::Double => "double",
            Type::Byte => "byte",
            Type::Short => "short",
            Type::Int => "int",
            Type::Long => "long",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Width of object identifiers recorded in the dump header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IdSize {
    /// 1-byte identifiers
    One,
    /// 2-byte identifiers
    Two,
    /// 4-byte identifiers
    #[default]
    Four,
    /// 8-byte identifiers
    Eight,
}

impl IdSize {
    /// Returns the width in bytes.
    pub fn bytes(self) -> usize {
        match self {
            IdSize::One => 1,
            IdSize::Two => 2,
            IdSize::Four => 4,
            IdSize::Eight => 8,
        }
    }
}

impl TryFrom<u8> for IdSize {
    type Error = HeapError;

    fn try_from(width: u8) -> Result<IdSize> {
        match width {
            1 => Ok(IdSize::One),
            2 => Ok(IdSize::Two),
            4 => Ok(IdSize::Four),
            8 => Ok(IdSize::Eight),
            _ => Err(HeapError::UnsupportedIdSize(width)),
        }
    }
}

impl From<IdSize> for u8 {
    fn from(size: IdSize) -> u8 {
        size.bytes() as u8
    }
}

/// Byte order of multi-byte values in the dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Most significant byte first (what HPROF writers emit)
    #[default]
    BigEndian,
    /// Least significant byte first
    LittleEndian,
}
