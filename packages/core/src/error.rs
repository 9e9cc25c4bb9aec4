//! Error types shared by every docsync layer.

use crate::path::{DocPath, PathError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("path error: {0}")]
    Path(#[from] PathError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A session call failed. Carried through this layer unchanged.
    #[error("remote call failed at {path}: {message}")]
    Remote { path: DocPath, message: String },

    #[error("binding '{key}' unavailable in environment '{environment}' after {attempts} attempts")]
    BindingUnavailable {
        environment: String,
        key: String,
        attempts: u32,
    },

    /// The node has no position in its parent (removed, stale or never linked).
    #[error("node is detached from the document")]
    DetachedNode,

    #[error("cannot use key '{key}' on {kind}")]
    InvalidKey { key: String, kind: &'static str },

    #[error("no value at {path}")]
    NotFound { path: DocPath },

    #[error("node is already linked under another parent")]
    AlreadyLinked,

    #[error("operation not supported: {operation}")]
    NotSupported { operation: &'static str },

    #[error("{message}")]
    Other { message: String },
}
