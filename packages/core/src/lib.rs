//! Core docsync: the shared vocabulary of every layer.
//!
//! - `DocPath`: slash-delimited address of a value inside a document
//! - `Error`: the error type every layer returns
//! - `RemoteSession`: point reads and writes against the authoritative document
//!
//! # Example
//!
//! ```rust
//! use docsync_core::{path, Error, RemoteSession};
//!
//! fn bump(session: &dyn RemoteSession) -> Result<(), Error> {
//!     session.update_at(&path!("/count"), "\"1\"")
//! }
//! ```

mod error;
mod path;
mod session;

pub use error::Error;
pub use path::{DocPath, PathError};
pub use session::{Listeners, RemoteSession, SharedSession};
