//! JSON-backed session implementations for docsync.

pub mod in_memory;
pub mod listeners;
pub mod value_utils;

pub use in_memory::{Call, InMemorySession};
pub use listeners::ListenerTable;
