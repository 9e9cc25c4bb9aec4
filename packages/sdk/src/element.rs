//! Locating elements by `id` and merging patches into them.

use serde_json::{Map, Value};

use docsync_core::DocPath;

fn is_element_with_id(node: &Value, id: &str) -> bool {
    node.get("id").and_then(Value::as_str) == Some(id)
}

/// Paths of every object whose `id` field equals `id`, depth-first in
/// document order. Matching does not stop descent: an element nested inside
/// another with the same id is reported too.
pub fn find_elements(tree: &Value, id: &str) -> Vec<DocPath> {
    let mut found = Vec::new();
    collect(tree, &DocPath::root(), id, &mut found);
    found
}

fn collect(node: &Value, path: &DocPath, id: &str, found: &mut Vec<DocPath>) {
    if is_element_with_id(node, id) {
        found.push(path.clone());
    }
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                collect(child, &path.child(key.as_str()), id, found);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect(child, &path.child(index.to_string()), id, found);
            }
        }
        _ => {}
    }
}

/// Apply an RFC 7396 merge patch to `target`.
///
/// - An object patch merges key by key, `null` removing the key.
/// - Any other patch replaces the target.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.shift_remove(key);
            } else {
                merge_patch(
                    target_map.entry(key.clone()).or_insert(Value::Null),
                    value,
                );
            }
        }
    }
}
