//! The session-bound SDK façade.

use serde::Serialize;
use serde_json::Value;

use docsync_core::{DocPath, Error, Listeners, PathError, SharedSession};
use docsync_document::Document;

use crate::element;

/// Entry point for scripts and embedders, bound to one remote session.
///
/// Explicit-path calls (`value_at`, `add_at`, ...) go straight to the
/// session. [`Sdk::open_document`] instead hands out a [`Document`] whose
/// writes are dispatched automatically.
#[derive(Clone)]
pub struct Sdk {
    session: SharedSession,
}

impl std::fmt::Debug for Sdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sdk").finish_non_exhaustive()
    }
}

impl Sdk {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// The full design document as JSON text.
    pub fn design_document(&self) -> Result<String, Error> {
        self.session.design_document()
    }

    /// Fetch the design document and wrap it, bound to this session.
    pub fn open_document(&self) -> Result<Document, Error> {
        Document::open(self.session.clone())
    }

    /// Point read. `path` is a pointer string such as `/frames/0/name`.
    pub fn value_at(&self, path: &str) -> Result<Option<Value>, Error> {
        let path = parse_path(path)?;
        match self.session.value_at(&path)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    pub fn add_at<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), Error> {
        let path = parse_path(path)?;
        self.session.add_at(&path, &serde_json::to_string(value)?)
    }

    pub fn update_at<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), Error> {
        let path = parse_path(path)?;
        self.session.update_at(&path, &serde_json::to_string(value)?)
    }

    pub fn delete_at(&self, path: &str) -> Result<(), Error> {
        self.session.delete_at(&parse_path(path)?)
    }

    /// The first element (depth-first, document order) whose `id` is `id`.
    pub fn element(&self, id: &str) -> Result<Option<Value>, Error> {
        let tree: Value = serde_json::from_str(&self.session.design_document()?)?;
        Ok(element::find_elements(&tree, id)
            .first()
            .and_then(|path| path.iter().try_fold(&tree, |node, key| lookup(node, key)))
            .cloned())
    }

    /// Merge-patch every element whose `id` is `id`, one `update_at` each.
    ///
    /// Returns the number of elements updated.
    pub fn update_element(&self, id: &str, patch: &Value) -> Result<usize, Error> {
        let tree: Value = serde_json::from_str(&self.session.design_document()?)?;
        let paths = element::find_elements(&tree, id);

        for path in &paths {
            let Some(current) = path.iter().try_fold(&tree, |node, key| lookup(node, key)) else {
                continue;
            };
            let mut merged = current.clone();
            element::merge_patch(&mut merged, patch);
            log::debug!("Updating element '{}' at {}", id, path);
            self.session
                .update_at(path, &serde_json::to_string(&merged)?)?;
        }
        Ok(paths.len())
    }

    pub fn add_event_listener(
        &self,
        path: &str,
        event_type: &str,
        listener: &str,
    ) -> Result<(), Error> {
        self.session
            .add_event_listener(&parse_path(path)?, event_type, listener)
    }

    pub fn remove_event_listener(
        &self,
        path: &str,
        event_type: &str,
        listener: &str,
    ) -> Result<(), Error> {
        self.session
            .remove_event_listener(&parse_path(path)?, event_type, listener)
    }

    pub fn event_listeners(&self, path: &str) -> Result<Listeners, Error> {
        self.session.event_listeners(&parse_path(path)?)
    }
}

/// Parse an explicit path. Empty segments, as in `/a//b`, are refused.
fn parse_path(path: &str) -> Result<DocPath, Error> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if !rest.is_empty() && rest.split('/').any(str::is_empty) {
        return Err(Error::Path(PathError::InvalidPath {
            message: format!("empty segment in '{}'", path),
        }));
    }
    Ok(DocPath::parse(path)?)
}

fn lookup<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
