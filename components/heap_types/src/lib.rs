//! Core types for heap snapshot analysis.
//!
//! This crate provides the vocabulary shared by every component that works on
//! a parsed heap dump: identities, field type tags, decoded field values,
//! allocation stack traces and the error type.
//!
//! # Overview
//!
//! - [`ObjectId`] - Identity of an object as recorded in the dump
//! - [`InstanceId`] / [`HeapId`] - Arena indices into a loaded snapshot
//! - [`Type`] - Basic field type tags
//! - [`Value`] - A decoded field value
//! - [`StackTrace`] / [`StackFrame`] - Allocation call stacks
//! - [`HeapError`] - Errors raised while loading or querying a snapshot
//!
//! # Examples
//!
//! ```
//! use heap_types::{IdSize, ObjectId, Type, Value};
//!
//! let ty = Type::from_tag(10).unwrap();
//! assert_eq!(ty, Type::Int);
//! assert_eq!(ty.size(IdSize::Four), 4);
//!
//! assert!(ObjectId::NULL.is_null());
//! assert_eq!(Value::Int(7).ty(), Type::Int);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod ids;
mod stack;
mod types;
mod value;

pub use error::{HeapError, Result};
pub use ids::{HeapId, InstanceId, ObjectId};
pub use stack::{StackFrame, StackTrace};
pub use types::{ByteOrder, IdSize, Type};
pub use value::Value;
