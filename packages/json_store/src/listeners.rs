//! Script listeners registered per node path and event type.

use std::collections::BTreeMap;

use docsync_core::{DocPath, Listeners};

/// Ordered listener payloads keyed by `(path, event type)`.
///
/// Adding a payload that is already present for the same key is a no-op;
/// equality is by payload value.
#[derive(Debug, Default, Clone)]
pub struct ListenerTable {
    entries: BTreeMap<DocPath, Listeners>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the payload was already registered.
    pub fn add(&mut self, path: &DocPath, event_type: &str, listener: &str) -> bool {
        let payloads = self
            .entries
            .entry(path.clone())
            .or_default()
            .entry(event_type.to_string())
            .or_default();

        if payloads.iter().any(|existing| existing == listener) {
            return false;
        }
        payloads.push(listener.to_string());
        true
    }

    /// Returns `false` when no such payload was registered.
    pub fn remove(&mut self, path: &DocPath, event_type: &str, listener: &str) -> bool {
        let Some(by_type) = self.entries.get_mut(path) else {
            return false;
        };
        let Some(payloads) = by_type.get_mut(event_type) else {
            return false;
        };
        let Some(index) = payloads.iter().position(|existing| existing == listener) else {
            return false;
        };
        payloads.remove(index);

        if payloads.is_empty() {
            by_type.remove(event_type);
        }
        if by_type.is_empty() {
            self.entries.remove(path);
        }
        true
    }

    pub fn get(&self, path: &DocPath) -> Listeners {
        self.entries.get(path).cloned().unwrap_or_default()
    }
}
