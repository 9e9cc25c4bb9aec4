//! In-memory remote session.
//!
//! Holds the authoritative document as a `serde_json::Value` and applies
//! point mutations to it. Stands in for the host engine in tests and for
//! embedders that have no engine at all.

use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use docsync_core::{DocPath, Error, Listeners, RemoteSession};

use crate::listeners::ListenerTable;
use crate::value_utils;

/// A mutating call received by an [`InMemorySession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Add { path: String, value: String },
    Update { path: String, value: String },
    Delete { path: String },
}

struct State {
    root: Value,
    listeners: ListenerTable,
    calls: Option<Vec<Call>>,
    failure: Option<String>,
}

/// A session over a document held in memory.
///
/// # Example
///
/// ```rust
/// use docsync_json_store::InMemorySession;
/// use docsync_core::{path, RemoteSession};
/// use serde_json::json;
///
/// let session = InMemorySession::with_data(json!({"count": "0"}));
/// session.update_at(&path!("/count"), "\"1\"").unwrap();
///
/// assert_eq!(session.snapshot().unwrap(), json!({"count": "1"}));
/// ```
pub struct InMemorySession {
    state: Mutex<State>,
}

impl InMemorySession {
    /// Create a session over an empty object.
    pub fn new() -> Self {
        Self::with_data(Value::Object(serde_json::Map::new()))
    }

    /// Create a session with initial data.
    pub fn with_data(root: Value) -> Self {
        Self {
            state: Mutex::new(State {
                root,
                listeners: ListenerTable::new(),
                calls: None,
                failure: None,
            }),
        }
    }

    /// Create a session from a JSON document.
    pub fn from_json(document: &str) -> Result<Self, Error> {
        Ok(Self::with_data(serde_json::from_str(document)?))
    }

    /// Record every mutating call, in arrival order.
    #[must_use]
    pub fn with_call_log(self) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.calls = Some(Vec::new());
        }
        self
    }

    /// Calls recorded so far. Empty unless built `with_call_log`.
    pub fn calls(&self) -> Vec<Call> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.calls.clone())
            .unwrap_or_default()
    }

    /// Drain the recorded calls.
    pub fn take_calls(&self) -> Vec<Call> {
        match self.state.lock() {
            Ok(mut state) => state.calls.as_mut().map(std::mem::take).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    /// Make every following mutating call fail with `Error::Remote`.
    pub fn fail_with(&self, message: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.failure = Some(message.into());
        }
    }

    pub fn clear_failure(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.failure = None;
        }
    }

    /// A copy of the current document.
    pub fn snapshot(&self) -> Result<Value, Error> {
        Ok(self.state()?.root.clone())
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, Error> {
        self.state.lock().map_err(|_| Error::Other {
            message: "lock poisoned".into(),
        })
    }

    /// Log the call, then fail if a failure is armed.
    fn begin(&self, call: Call, path: &DocPath) -> Result<MutexGuard<'_, State>, Error> {
        let mut state = self.state()?;
        log::debug!("In-memory session received {:?}", call);
        if let Some(calls) = state.calls.as_mut() {
            calls.push(call);
        }
        if let Some(message) = &state.failure {
            return Err(Error::Remote {
                path: path.clone(),
                message: message.clone(),
            });
        }
        Ok(state)
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteSession for InMemorySession {
    fn design_document(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.state()?.root)?)
    }

    fn value_at(&self, path: &DocPath) -> Result<Option<String>, Error> {
        let state = self.state()?;
        match value_utils::get_path(&state.root, path)? {
            Some(value) => Ok(Some(serde_json::to_string(value)?)),
            None => Ok(None),
        }
    }

    fn add_at(&self, path: &DocPath, value: &str) -> Result<(), Error> {
        let call = Call::Add {
            path: path.to_string(),
            value: value.to_string(),
        };
        let mut state = self.begin(call, path)?;
        let parsed: Value = serde_json::from_str(value)?;
        value_utils::add_path(&mut state.root, path, parsed)
    }

    fn update_at(&self, path: &DocPath, value: &str) -> Result<(), Error> {
        let call = Call::Update {
            path: path.to_string(),
            value: value.to_string(),
        };
        let mut state = self.begin(call, path)?;
        let parsed: Value = serde_json::from_str(value)?;
        value_utils::replace_path(&mut state.root, path, parsed)
    }

    fn delete_at(&self, path: &DocPath) -> Result<(), Error> {
        let call = Call::Delete {
            path: path.to_string(),
        };
        let mut state = self.begin(call, path)?;
        value_utils::delete_path(&mut state.root, path).map(|_| ())
    }

    fn add_event_listener(
        &self,
        path: &DocPath,
        event_type: &str,
        listener: &str,
    ) -> Result<(), Error> {
        self.state()?.listeners.add(path, event_type, listener);
        Ok(())
    }

    fn remove_event_listener(
        &self,
        path: &DocPath,
        event_type: &str,
        listener: &str,
    ) -> Result<(), Error> {
        self.state()?.listeners.remove(path, event_type, listener);
        Ok(())
    }

    fn event_listeners(&self, path: &DocPath) -> Result<Listeners, Error> {
        Ok(self.state()?.listeners.get(path))
    }
}
