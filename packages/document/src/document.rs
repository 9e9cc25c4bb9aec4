//! The synchronized document and its read accessors.

use serde_json::Value;

use docsync_core::{DocPath, Error, SharedSession};

use crate::arena::{parse_index, Arena, Body, Kind, NodeId, Slot};

/// A wrapped JSON tree bound to a remote session.
///
/// Reads never touch the session. Writes go through [`Document::set`],
/// [`Document::remove`], [`Document::define`] and friends, which issue the
/// matching point mutation against the session before updating the local
/// tree. A document without a session applies writes locally only.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use docsync_document::Document;
/// use docsync_json_store::InMemorySession;
/// use serde_json::json;
///
/// let session = Arc::new(InMemorySession::with_data(json!({"count": "0"})));
/// let mut doc = Document::open(session.clone()).unwrap();
/// let root = doc.root();
///
/// doc.set(root, "count", "1").unwrap();
/// assert_eq!(session.snapshot().unwrap(), json!({"count": "1"}));
/// ```
pub struct Document {
    pub(crate) arena: Arena,
    pub(crate) root: NodeId,
    pub(crate) session: Option<SharedSession>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("nodes", &self.arena.live())
            .field("session", &self.session.is_some())
            .finish()
    }
}

impl Document {
    /// Wrap `value` into a new local-only document.
    ///
    /// The root must be an object or an array.
    pub fn new(value: Value) -> Result<Self, Error> {
        let mut arena = Arena::default();
        let root = match Self::wrap_into(&mut arena, value) {
            Slot::Wrapped(root) => root,
            Slot::Plain(other) => {
                return Err(Error::Other {
                    message: format!("document root must be an object or array, got {}", other),
                })
            }
        };

        Ok(Self {
            arena,
            root,
            session: None,
        })
    }

    /// Wrap `value` into a new document bound to `session`.
    pub fn with_session(value: Value, session: SharedSession) -> Result<Self, Error> {
        let mut doc = Self::new(value)?;
        doc.attach_session(session);
        Ok(doc)
    }

    /// Fetch the session's snapshot and wrap it.
    pub fn open(session: SharedSession) -> Result<Self, Error> {
        let text = session.design_document()?;
        let value: Value = serde_json::from_str(&text)?;
        log::debug!("Opened design document ({} bytes)", text.len());
        Self::with_session(value, session)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn session(&self) -> Option<&SharedSession> {
        self.session.as_ref()
    }

    /// Bind the root to `session`.
    ///
    /// The handle is kept beside the tree: it is never serialized by
    /// [`Document::to_value`] and never forwarded to the session itself.
    pub fn attach_session(&mut self, session: SharedSession) {
        self.session = Some(session);
    }

    /// Whether `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.resolve_path(node).is_ok()
    }

    pub fn kind(&self, node: NodeId) -> Result<Kind, Error> {
        Ok(self.arena.get(node)?.body.kind())
    }

    /// Number of entries (keys or elements).
    pub fn len(&self, node: NodeId) -> Result<usize, Error> {
        Ok(match &self.arena.get(node)?.body {
            Body::Map(entries) => entries.len(),
            Body::Seq(items) => items.len(),
        })
    }

    pub fn is_empty(&self, node: NodeId) -> Result<bool, Error> {
        Ok(self.len(node)? == 0)
    }

    /// Keys in enumeration order; decimal indices for sequences.
    pub fn keys(&self, node: NodeId) -> Result<Vec<String>, Error> {
        Ok(match &self.arena.get(node)?.body {
            Body::Map(entries) => entries.keys().cloned().collect(),
            Body::Seq(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        })
    }

    pub fn contains(&self, node: NodeId, key: &str) -> Result<bool, Error> {
        Ok(self.get(node, key)?.is_some())
    }

    /// Read one entry.
    ///
    /// Sequences answer `length` with their element count, as a plain value.
    pub fn get(&self, node: NodeId, key: &str) -> Result<Option<Slot>, Error> {
        Ok(match &self.arena.get(node)?.body {
            Body::Map(entries) => entries.get(key).cloned(),
            Body::Seq(items) if key == "length" => Some(Slot::Plain(items.len().into())),
            Body::Seq(items) => parse_index(key)
                .and_then(|index| items.get(index))
                .cloned(),
        })
    }

    /// The wrapped child under `key`, if that entry is an object or sequence.
    pub fn child(&self, node: NodeId, key: &str) -> Result<Option<NodeId>, Error> {
        Ok(self.get(node, key)?.and_then(|slot| slot.node()))
    }

    /// The entry under `key`, materialized.
    pub fn value(&self, node: NodeId, key: &str) -> Result<Option<Value>, Error> {
        match self.get(node, key)? {
            Some(Slot::Plain(value)) => Ok(Some(value)),
            Some(Slot::Wrapped(child)) => self.to_value(child).map(Some),
            None => Ok(None),
        }
    }

    /// Materialize `node` and everything beneath it.
    pub fn to_value(&self, node: NodeId) -> Result<Value, Error> {
        let slot_value = |slot: &Slot| match slot {
            Slot::Plain(value) => Ok(value.clone()),
            Slot::Wrapped(child) => self.to_value(*child),
        };

        Ok(match &self.arena.get(node)?.body {
            Body::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, slot)| Ok((key.clone(), slot_value(slot)?)))
                    .collect::<Result<_, Error>>()?,
            ),
            Body::Seq(items) => {
                Value::Array(items.iter().map(slot_value).collect::<Result<_, _>>()?)
            }
        })
    }

    /// Walk `path` from the root to a wrapped node.
    pub fn node_at(&self, path: &DocPath) -> Result<Option<NodeId>, Error> {
        let mut cursor = self.root;
        for key in path.iter() {
            match self.child(cursor, key)? {
                Some(next) => cursor = next,
                None => return Ok(None),
            }
        }
        Ok(Some(cursor))
    }
}
