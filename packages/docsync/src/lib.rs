//! docsync: plain edits of a document tree, dispatched as point mutations
//! against a remote, path-addressed document store.
//!
//! The layers, leaf first:
//! - [`docsync_core`]: paths, errors and the [`RemoteSession`] boundary
//! - [`docsync_json_store`]: an in-memory session
//! - [`docsync_document`]: the wrapped tree and its mutation dispatch
//! - [`docsync_sdk`]: the session-bound façade
//! - [`docsync_binding`]: registry and bounded-retry acquisition

pub use docsync_binding::{
    AcquireConfig, Acquirer, BindingRegistry, BindingSource, DEFAULT_ENVIRONMENT,
};
pub use docsync_core::{path, DocPath, Error, Listeners, PathError, RemoteSession, SharedSession};
pub use docsync_document::{Document, Kind, NodeId, Slot};
pub use docsync_json_store::{Call, InMemorySession};
pub use docsync_sdk::Sdk;

/// Acquire the SDK, fetch the design document and wrap it.
///
/// Fails with [`Error::BindingUnavailable`] if the host never publishes its
/// session within the acquirer's bound.
pub async fn open_design_document<S: BindingSource>(
    acquirer: &Acquirer<S>,
) -> Result<Document, Error> {
    acquirer.try_acquire().await?.open_document()
}
