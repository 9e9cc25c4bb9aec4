//! Path resolution from live tree structure.

use docsync_core::{DocPath, Error};

use crate::arena::NodeId;
use crate::document::Document;

impl Document {
    /// The current canonical path of `node`.
    ///
    /// Paths are never stored. Each call walks the parent links up to the
    /// root and, at every step, scans the parent's entries in order for the
    /// one holding the child, so the result reflects where the node sits now.
    ///
    /// Fails with [`Error::DetachedNode`] when the node has been removed, was
    /// never linked, or cannot be found among its parent's entries.
    pub fn resolve_path(&self, node: NodeId) -> Result<DocPath, Error> {
        let mut components = Vec::new();
        let mut current = node;

        loop {
            let Some(parent) = self.arena.get(current)?.parent else {
                if current == self.root {
                    break;
                }
                return Err(Error::DetachedNode);
            };

            let segment = self
                .arena
                .get(parent)?
                .body
                .position_of(current)
                .ok_or(Error::DetachedNode)?;
            components.push(segment);
            current = parent;
        }

        components.reverse();
        Ok(DocPath { components })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Body, Slot};
    use docsync_core::path;
    use serde_json::json;

    #[test]
    fn root_is_slash() {
        let doc = Document::new(json!({"a": {"b": 1}})).unwrap();
        let path = doc.resolve_path(doc.root()).unwrap();
        assert!(path.is_root());
        assert_eq!(path.to_string(), "/");
    }

    #[test]
    fn nested_map_path() {
        let doc = Document::new(json!({"a": {"b": 1}})).unwrap();
        let a = doc.child(doc.root(), "a").unwrap().unwrap();
        let path = doc.resolve_path(a).unwrap();
        assert_eq!(path, path!("/a"));
        assert_eq!(path.as_prefix(), "/a/");
        assert_eq!(path.child("b").to_string(), "/a/b");
    }

    #[test]
    fn sequence_indices_are_decimal() {
        let doc = Document::new(json!({"frames": [{}, {"layers": [{}, {}, {}]}]})).unwrap();
        let layer = doc
            .node_at(&path!("/frames/1/layers/2"))
            .unwrap()
            .unwrap();
        assert_eq!(
            doc.resolve_path(layer).unwrap().to_string(),
            "/frames/1/layers/2"
        );
    }

    #[test]
    fn path_tracks_moves() {
        let mut doc = Document::new(json!({"list": [{"id": "a"}, {"id": "b"}]})).unwrap();
        let list = doc.child(doc.root(), "list").unwrap().unwrap();
        let second = doc.child(list, "1").unwrap().unwrap();
        assert_eq!(doc.resolve_path(second).unwrap(), path!("/list/1"));

        doc.remove(list, "0").unwrap();
        assert_eq!(doc.resolve_path(second).unwrap(), path!("/list/0"));
    }

    #[test]
    fn missing_from_parent_is_detached() {
        let mut doc = Document::new(json!({"a": {}})).unwrap();
        let root = doc.root();
        let a = doc.child(root, "a").unwrap().unwrap();

        // Drop the entry behind the tree's back; the parent link remains.
        if let Body::Map(entries) = &mut doc.arena.get_mut(root).unwrap().body {
            entries.insert("a".to_string(), Slot::Plain(json!(null)));
        }
        assert!(matches!(doc.resolve_path(a), Err(Error::DetachedNode)));
    }

    #[test]
    fn special_keys_are_escaped() {
        let doc = Document::new(json!({"a/b": {"c~d": {}}})).unwrap();
        let inner = doc
            .node_at(&DocPath::from_components(["a/b", "c~d"]))
            .unwrap()
            .unwrap();
        assert_eq!(doc.resolve_path(inner).unwrap().to_string(), "/a~1b/c~0d");
    }
}
