//! Handing the host's session across the runtime boundary.
//!
//! The host publishes its session into a [`BindingRegistry`] once it has
//! finished starting. An [`Acquirer`] polls for it with a bounded number of
//! attempts and builds the single [`docsync_sdk::Sdk`] bound to it.

mod acquire;
mod config;
mod registry;

pub use acquire::Acquirer;
pub use config::AcquireConfig;
pub use registry::{BindingRegistry, BindingSource, DEFAULT_ENVIRONMENT};
