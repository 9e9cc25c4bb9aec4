//! The docsync SDK façade.
//!
//! One [`Sdk`] is bound to one remote session. It exposes explicit-path
//! reads and writes, element lookup by id, event-listener registration, and
//! [`Sdk::open_document`] for automatically dispatched editing.

pub mod element;
mod sdk;

pub use sdk::Sdk;
