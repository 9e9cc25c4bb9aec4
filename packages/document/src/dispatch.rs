//! Mutation dispatch.
//!
//! Every write resolves the target's current path, issues exactly one point
//! mutation against the session (or none, for sequence length bookkeeping),
//! and only then updates the local tree. A failing session call returns its
//! error unchanged and the local write does not happen. There is no rollback
//! across several writes: each one stands alone.

use serde::Serialize;
use serde_json::Value;

use docsync_core::{DocPath, Error};

use crate::arena::{parse_index, Body, Kind, NodeId, Slot};
use crate::document::Document;

/// What a key addresses on a particular node.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Field(String),
    Index(usize),
    /// A sequence's `length`. Bookkeeping, not document content.
    Length,
}

impl Target {
    fn segment(&self) -> String {
        match self {
            Target::Field(key) => key.clone(),
            Target::Index(index) => index.to_string(),
            Target::Length => "length".to_string(),
        }
    }
}

impl Document {
    /// Write `value` under `key`.
    ///
    /// The value is deep-copied through its JSON form first, so the caller's
    /// own data stays independent of the document. Existing keys are
    /// dispatched as `update_at`, new ones as `add_at`. Writing a sequence's
    /// `length` truncates or pads it locally without any remote call.
    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        node: NodeId,
        key: &str,
        value: &T,
    ) -> Result<(), Error> {
        let path = self.resolve_path(node)?;
        let copy = serde_json::to_value(value)?;
        let target = self.target(node, key)?;

        if target == Target::Length {
            return self.resize(node, &copy);
        }

        let exists = self.has_target(node, &target)?;
        self.dispatch_write(&path.child(target.segment()), &copy, exists)?;

        let slot = Self::wrap_into(&mut self.arena, copy);
        self.store(node, &target, slot)
    }

    /// Define `key` with `value` as given.
    ///
    /// Unlike [`Document::set`] the value is not round-tripped through
    /// serde: it is moved into the document. A `Slot::Wrapped` node from
    /// [`Document::wrap`] is linked in place, provided nothing owns it yet.
    pub fn define(&mut self, node: NodeId, key: &str, value: impl Into<Slot>) -> Result<(), Error> {
        let slot = value.into();
        let path = self.resolve_path(node)?;
        let target = self.target(node, key)?;

        if let Slot::Wrapped(child) = slot {
            if child == self.root || self.arena.get(child)?.parent.is_some() {
                return Err(Error::AlreadyLinked);
            }
        }

        if target == Target::Length {
            let len = match &slot {
                Slot::Plain(value) => value.clone(),
                Slot::Wrapped(_) => Value::Null,
            };
            return self.resize(node, &len);
        }

        let exists = self.has_target(node, &target)?;
        let field = path.child(target.segment());
        match &slot {
            Slot::Plain(value) => self.dispatch_write(&field, value, exists)?,
            Slot::Wrapped(child) => {
                let value = self.to_value(*child)?;
                self.dispatch_write(&field, &value, exists)?;
            }
        }

        let slot = match slot {
            Slot::Plain(value) => Self::wrap_into(&mut self.arena, value),
            wrapped => wrapped,
        };
        self.store(node, &target, slot)
    }

    /// Remove `key`.
    ///
    /// Returns `false`, without any remote call, when there is nothing to
    /// remove. Sequence elements are spliced out so later indices shift down,
    /// matching the session's delete. Handles into the removed subtree become
    /// detached.
    pub fn remove(&mut self, node: NodeId, key: &str) -> Result<bool, Error> {
        let target = self.target(node, key)?;
        if target == Target::Length || !self.has_target(node, &target)? {
            return Ok(false);
        }

        let path = self.resolve_path(node)?.child(target.segment());
        if let Some(session) = &self.session {
            log::debug!("Dispatching deleteAt {}", path);
            session.delete_at(&path)?;
        }

        let removed = match (&mut self.arena.get_mut(node)?.body, &target) {
            (Body::Map(entries), Target::Field(key)) => entries.shift_remove(key.as_str()),
            (Body::Seq(items), Target::Index(index)) => Some(items.remove(*index)),
            _ => None,
        };
        if let Some(Slot::Wrapped(child)) = removed {
            self.arena.release(child);
        }
        Ok(true)
    }

    /// Append `value` to a sequence: one `add_at` at index `len`.
    pub fn push<T: Serialize + ?Sized>(&mut self, node: NodeId, value: &T) -> Result<(), Error> {
        let kind = self.kind(node)?;
        if kind != Kind::Seq {
            return Err(Error::InvalidKey {
                key: "push".to_string(),
                kind: kind.describe(),
            });
        }
        let len = self.len(node)?;
        self.set(node, &len.to_string(), value)
    }

    /// Set a sequence's length locally. Never dispatched.
    pub fn set_len(&mut self, node: NodeId, len: usize) -> Result<(), Error> {
        self.set(node, "length", &len)
    }

    fn target(&self, node: NodeId, key: &str) -> Result<Target, Error> {
        match &self.arena.get(node)?.body {
            Body::Map(_) => Ok(Target::Field(key.to_string())),
            Body::Seq(_) if key == "length" => Ok(Target::Length),
            Body::Seq(_) => parse_index(key)
                .map(Target::Index)
                .ok_or_else(|| Error::InvalidKey {
                    key: key.to_string(),
                    kind: Kind::Seq.describe(),
                }),
        }
    }

    fn has_target(&self, node: NodeId, target: &Target) -> Result<bool, Error> {
        Ok(match (&self.arena.get(node)?.body, target) {
            (Body::Map(entries), Target::Field(key)) => entries.contains_key(key.as_str()),
            (Body::Seq(items), Target::Index(index)) => *index < items.len(),
            (Body::Seq(_), Target::Length) => true,
            _ => false,
        })
    }

    fn dispatch_write(&self, path: &DocPath, value: &Value, exists: bool) -> Result<(), Error> {
        let Some(session) = &self.session else {
            log::trace!("No session bound; {} applied locally only", path);
            return Ok(());
        };

        let text = serde_json::to_string(value)?;
        if exists {
            log::debug!("Dispatching updateAt {} = {}", path, text);
            session.update_at(path, &text)
        } else {
            log::debug!("Dispatching addAt {} = {}", path, text);
            session.add_at(path, &text)
        }
    }

    /// Place `slot` under `target`, linking it and releasing whatever it
    /// replaces.
    fn store(&mut self, node: NodeId, target: &Target, slot: Slot) -> Result<(), Error> {
        if let Slot::Wrapped(child) = slot {
            self.arena.link(child, node)?;
        }

        let replaced = match (&mut self.arena.get_mut(node)?.body, target) {
            (Body::Map(entries), Target::Field(key)) => entries.insert(key.clone(), slot),
            (Body::Seq(items), Target::Index(index)) => {
                if *index < items.len() {
                    Some(std::mem::replace(&mut items[*index], slot))
                } else {
                    items.resize(*index, Slot::Plain(Value::Null));
                    items.push(slot);
                    None
                }
            }
            _ => None,
        };

        if let Some(Slot::Wrapped(old)) = replaced {
            self.arena.release(old);
        }
        Ok(())
    }

    fn resize(&mut self, node: NodeId, len: &Value) -> Result<(), Error> {
        let len = len
            .as_u64()
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(|| Error::Other {
                message: format!("invalid sequence length: {}", len),
            })?;

        let dropped = match &mut self.arena.get_mut(node)?.body {
            Body::Seq(items) if len < items.len() => items.split_off(len),
            Body::Seq(items) => {
                items.resize(len, Slot::Plain(Value::Null));
                Vec::new()
            }
            Body::Map(_) => Vec::new(),
        };

        for child in dropped.iter().filter_map(Slot::node) {
            self.arena.release(child);
        }
        Ok(())
    }
}
