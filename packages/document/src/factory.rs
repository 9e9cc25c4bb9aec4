//! Wrapping plain values into document nodes.

use indexmap::IndexMap;
use serde_json::Value;

use docsync_core::Error;

use crate::arena::{Arena, Body, Node, NodeId, Slot};
use crate::document::Document;

impl Document {
    /// Wrap `value` so that it can be stored in this document.
    ///
    /// Scalars come back as `Slot::Plain` unchanged, and an already wrapped
    /// slot is returned as-is. Objects and arrays become nodes of this
    /// document, nested containers included, in source key order. The
    /// returned node is not linked anywhere yet: hand it to
    /// [`Document::define`] to place it, or [`Document::discard`] it.
    pub fn wrap(&mut self, value: impl Into<Slot>) -> Slot {
        match value.into() {
            Slot::Plain(value) => Self::wrap_into(&mut self.arena, value),
            wrapped => wrapped,
        }
    }

    /// Free a wrapped node that was never linked into the tree.
    pub fn discard(&mut self, node: NodeId) -> Result<(), Error> {
        if node == self.root || self.arena.get(node)?.parent.is_some() {
            return Err(Error::AlreadyLinked);
        }
        self.arena.release(node);
        Ok(())
    }

    /// Children are wrapped first and adopted by the new node before it is
    /// returned, so no caller ever sees a child without its parent link.
    pub(crate) fn wrap_into(arena: &mut Arena, value: Value) -> Slot {
        let body = match value {
            Value::Object(map) => Body::Map(
                map.into_iter()
                    .map(|(key, child)| (key, Self::wrap_into(arena, child)))
                    .collect::<IndexMap<_, _>>(),
            ),
            Value::Array(items) => Body::Seq(
                items
                    .into_iter()
                    .map(|child| Self::wrap_into(arena, child))
                    .collect(),
            ),
            scalar => return Slot::Plain(scalar),
        };

        let children = body.children();
        let id = arena.insert(Node { parent: None, body });
        arena.adopt(id, &children);
        Slot::Wrapped(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_pass_through() {
        let mut doc = Document::new(json!({})).unwrap();
        assert_eq!(doc.wrap(json!(1)), Slot::Plain(json!(1)));
        assert_eq!(doc.wrap(json!("s")), Slot::Plain(json!("s")));
        assert_eq!(doc.wrap(Value::Null), Slot::Plain(Value::Null));
    }

    #[test]
    fn wrapping_is_idempotent() {
        let mut doc = Document::new(json!({})).unwrap();
        let once = doc.wrap(json!({"a": [1, 2]}));
        assert!(once.is_wrapped());

        let twice = doc.wrap(once.clone());
        assert_eq!(twice, once);

        let root = doc.root();
        assert_eq!(doc.wrap(root), Slot::Wrapped(root));
    }

    #[test]
    fn nested_children_know_their_parent() {
        let mut doc = Document::new(json!({})).unwrap();
        let outer = doc.wrap(json!({"inner": {"x": 1}})).node().unwrap();
        let inner = doc.child(outer, "inner").unwrap().unwrap();

        assert_eq!(doc.arena.get(inner).unwrap().parent, Some(outer));
        assert_eq!(doc.arena.get(outer).unwrap().parent, None);
    }

    #[test]
    fn wrapping_keeps_key_order() {
        let mut doc = Document::new(json!({})).unwrap();
        let node = doc.wrap(json!({"b": 1, "a": 2, "c": 3})).node().unwrap();
        assert_eq!(doc.keys(node).unwrap(), vec!["b", "a", "c"]);
    }

    #[test]
    fn unlinked_nodes_are_detached_and_discardable() {
        let mut doc = Document::new(json!({"kept": {}})).unwrap();
        let loose = doc.wrap(json!({"x": {}})).node().unwrap();
        assert!(!doc.is_attached(loose));

        doc.discard(loose).unwrap();
        assert!(matches!(doc.keys(loose), Err(Error::DetachedNode)));

        let root = doc.root();
        let kept = doc.child(root, "kept").unwrap().unwrap();
        assert!(matches!(doc.discard(kept), Err(Error::AlreadyLinked)));
        assert!(matches!(doc.discard(root), Err(Error::AlreadyLinked)));
    }
}
