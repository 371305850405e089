#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from pipeline_desk for tests
pub use pipeline_desk::{EntryKind, InputMode, LogEntry, ModelDescriptor, PendingInput};
