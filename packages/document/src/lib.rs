//! The synchronized document tree.
//!
//! A [`Document`] wraps a JSON object tree into arena-stored nodes. Mutation
//! goes through explicit accessors that turn each local change into one point
//! call against the bound [`docsync_core::RemoteSession`]:
//!
//! - [`Document::wrap`]: wrap plain values, idempotently
//! - [`Document::resolve_path`]: derive a node's path from live structure
//! - [`Document::set`], [`Document::remove`], [`Document::define`]: dispatch
//!
//! Handles ([`NodeId`]) into removed subtrees go stale; using one fails with
//! [`docsync_core::Error::DetachedNode`].

mod arena;
mod dispatch;
mod document;
mod factory;
mod resolve;

pub use arena::{Kind, NodeId, Slot};
pub use document::Document;
