//! Node storage.
//!
//! Every wrapped object or sequence lives in one owned table. Parent links
//! are indices into that table and handles carry a generation, so a handle to
//! a released node can never observe whatever reuses its slot. Handles also
//! carry the id of the arena that issued them and are refused by any other.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde_json::Value;

use docsync_core::Error;

/// Handle to a wrapped node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    arena: u64,
    index: u32,
    generation: u32,
}

/// A value as stored in, or handed to, a document.
///
/// `Wrapped` is the marker for an already-intercepted node: wrapping it again
/// returns it unchanged. Inside a document, objects and sequences are always
/// `Wrapped` and `Plain` only ever holds scalars.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    Plain(Value),
    Wrapped(NodeId),
}

impl Slot {
    pub fn is_wrapped(&self) -> bool {
        matches!(self, Slot::Wrapped(_))
    }

    pub fn node(&self) -> Option<NodeId> {
        match self {
            Slot::Wrapped(id) => Some(*id),
            Slot::Plain(_) => None,
        }
    }

    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            Slot::Plain(value) => Some(value),
            Slot::Wrapped(_) => None,
        }
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Slot::Plain(value)
    }
}

impl From<NodeId> for Slot {
    fn from(id: NodeId) -> Self {
        Slot::Wrapped(id)
    }
}

/// A sequence index in canonical decimal form: no sign, no leading zeros.
pub(crate) fn parse_index(key: &str) -> Option<usize> {
    let index = key.parse::<usize>().ok()?;
    (index.to_string() == key).then_some(index)
}

/// Shape of a wrapped node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Map,
    Seq,
}

impl Kind {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            Kind::Map => "a mapping",
            Kind::Seq => "a sequence",
        }
    }
}

#[derive(Debug)]
pub(crate) enum Body {
    Map(IndexMap<String, Slot>),
    Seq(Vec<Slot>),
}

impl Body {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Body::Map(_) => Kind::Map,
            Body::Seq(_) => Kind::Seq,
        }
    }

    /// The key under which `child` sits, scanning in enumeration order.
    pub(crate) fn position_of(&self, child: NodeId) -> Option<String> {
        match self {
            Body::Map(entries) => entries
                .iter()
                .find(|(_, slot)| slot.node() == Some(child))
                .map(|(key, _)| key.clone()),
            Body::Seq(items) => items
                .iter()
                .position(|slot| slot.node() == Some(child))
                .map(|index| index.to_string()),
        }
    }

    pub(crate) fn children(&self) -> Vec<NodeId> {
        match self {
            Body::Map(entries) => entries.values().filter_map(Slot::node).collect(),
            Body::Seq(items) => items.iter().filter_map(Slot::node).collect(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) body: Body,
}

#[derive(Debug)]
struct Entry {
    generation: u32,
    node: Option<Node>,
}

static NEXT_ARENA: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub(crate) struct Arena {
    id: u64,
    entries: Vec<Entry>,
    free: Vec<u32>,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            id: NEXT_ARENA.fetch_add(1, Ordering::Relaxed),
            entries: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl Arena {
    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.node = Some(node);
            return NodeId {
                arena: self.id,
                index,
                generation: entry.generation,
            };
        }

        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            arena: self.id,
            index,
            generation: 0,
        }
    }

    fn entry(&self, id: NodeId) -> Option<&Node> {
        if id.arena != self.id {
            return None;
        }
        self.entries
            .get(id.index as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_ref())
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.arena != self.id {
            return None;
        }
        self.entries
            .get_mut(id.index as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_mut())
    }

    pub(crate) fn get(&self, id: NodeId) -> Result<&Node, Error> {
        self.entry(id).ok_or(Error::DetachedNode)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, Error> {
        self.entry_mut(id).ok_or(Error::DetachedNode)
    }

    /// Point each of `children` at `parent`.
    ///
    /// Only used for nodes created in the same call, which have no parent yet.
    pub(crate) fn adopt(&mut self, parent: NodeId, children: &[NodeId]) {
        for child in children {
            if let Some(node) = self.entry_mut(*child) {
                debug_assert!(node.parent.is_none());
                node.parent = Some(parent);
            }
        }
    }

    /// Link a single existing node under `parent`, refusing a second owner.
    pub(crate) fn link(&mut self, child: NodeId, parent: NodeId) -> Result<(), Error> {
        let node = self.get_mut(child)?;
        if node.parent.is_some() {
            return Err(Error::AlreadyLinked);
        }
        node.parent = Some(parent);
        Ok(())
    }

    /// Free `id` and everything beneath it. Outstanding handles go stale.
    pub(crate) fn release(&mut self, id: NodeId) {
        let arena = self.id;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(entry) = self
                .entries
                .get_mut(current.index as usize)
                .filter(|entry| current.arena == arena && entry.generation == current.generation)
            else {
                continue;
            };
            if let Some(node) = entry.node.take() {
                pending.extend(node.body.children());
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
    }

    /// Number of live nodes.
    pub(crate) fn live(&self) -> usize {
        self.entries.iter().filter(|e| e.node.is_some()).count()
    }
}
