//! Allocation stack traces.
//!
//! Stack traces are loaded once per dump and shared between every instance
//! allocated from the same call site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single frame of an allocation call stack.
///
/// # Examples
///
/// ```
/// use heap_types::StackFrame;
///
/// let frame = StackFrame {
///     method_name: "onCreate".to_string(),
///     class_name: "com.example.MainActivity".to_string(),
///     source_file: Some("MainActivity.java".to_string()),
///     line: Some(42),
/// };
///
/// assert_eq!(frame.to_string(), "com.example.MainActivity.onCreate(MainActivity.java:42)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Name of the executing method
    pub method_name: String,
    /// Fully qualified name of the declaring class
    pub class_name: String,
    /// Source file, when the dump recorded one
    pub source_file: Option<String>,
    /// Line number, or None for unknown and native frames
    pub line: Option<u32>,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.class_name, self.method_name)?;
        match (&self.source_file, self.line) {
            (Some(file), Some(line)) => write!(f, "{}:{}", file, line)?,
            (Some(file), None) => write!(f, "{}", file)?,
            (None, _) => write!(f, "Unknown Source")?,
        }
        write!(f, ")")
    }
}

/// Call stack recorded when an object was allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTrace {
    /// Serial number the dump uses to refer to this trace
    pub serial: u32,
    /// Serial number of the allocating thread
    pub thread_serial: u32,
    /// Frames, innermost first
    pub frames: Vec<StackFrame>,
}

impl StackTrace {
    /// Creates an empty trace for a thread.
    pub fn new(serial: u32, thread_serial: u32) -> Self {
        StackTrace {
            serial,
            thread_serial,
            frames: Vec::new(),
        }
    }

    /// Returns the innermost frame, if any.
    pub fn top(&self) -> Option<&StackFrame> {
        self.frames.first()
    }
}
