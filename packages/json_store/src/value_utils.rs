//! Utilities for navigating and modifying `serde_json::Value` trees by path.
//!
//! Mutation follows JSON-pointer patch semantics: `add` inserts into arrays
//! (or appends at `-`/len) and creates-or-overwrites object fields, `replace`
//! requires the target to exist, `delete` erases and shifts array elements.

use serde_json::Value;

use docsync_core::{DocPath, Error, PathError};

fn parse_index(component: &str, position: usize) -> Result<usize, Error> {
    component.parse::<usize>().map_err(|e| {
        Error::Path(PathError::InvalidPath {
            message: format!(
                "component '{}' at position {}: expected array index, got: {}",
                component, position, e
            ),
        })
    })
}

fn split_parent(path: &DocPath) -> Result<(DocPath, &str), Error> {
    match (path.parent(), path.last()) {
        (Some(parent), Some(last)) => Ok((parent, last)),
        _ => Err(Error::Path(PathError::InvalidPath {
            message: "the root has no parent".to_string(),
        })),
    }
}

/// Get a reference to a sub-tree at the given path.
pub fn get_path<'a>(tree: &'a Value, path: &DocPath) -> Result<Option<&'a Value>, Error> {
    let mut cursor = tree;
    for (i, component) in path.iter().enumerate() {
        match cursor {
            Value::Object(map) => match map.get(component.as_str()) {
                Some(next) => cursor = next,
                None => return Ok(None),
            },
            Value::Array(arr) => {
                let index = parse_index(component, i)?;
                match arr.get(index) {
                    Some(next) => cursor = next,
                    None => return Ok(None),
                }
            }
            // Can't traverse into primitive values
            _ => return Ok(None),
        }
    }

    Ok(Some(cursor))
}

/// Get a mutable reference to a sub-tree at the given path.
pub fn get_path_mut<'a>(
    tree: &'a mut Value,
    path: &DocPath,
) -> Result<Option<&'a mut Value>, Error> {
    let mut cursor = tree;
    for (i, component) in path.iter().enumerate() {
        match cursor {
            Value::Object(map) => match map.get_mut(component.as_str()) {
                Some(next) => cursor = next,
                None => return Ok(None),
            },
            Value::Array(arr) => {
                let index = parse_index(component, i)?;
                match arr.get_mut(index) {
                    Some(next) => cursor = next,
                    None => return Ok(None),
                }
            }
            _ => return Ok(None),
        }
    }

    Ok(Some(cursor))
}

fn parent_mut<'a>(tree: &'a mut Value, path: &DocPath) -> Result<(&'a mut Value, String), Error> {
    let (parent_path, last) = split_parent(path)?;
    let last = last.to_string();
    let parent = get_path_mut(tree, &parent_path)?.ok_or_else(|| Error::NotFound {
        path: parent_path.clone(),
    })?;
    Ok((parent, last))
}

/// Add a value at the given path.
///
/// Adding at the root replaces the whole tree.
pub fn add_path(tree: &mut Value, path: &DocPath, value: Value) -> Result<(), Error> {
    if path.is_root() {
        *tree = value;
        return Ok(());
    }

    let (parent, key) = parent_mut(tree, path)?;
    match parent {
        Value::Object(map) => {
            map.insert(key, value);
            Ok(())
        }
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                return Ok(());
            }
            let index = parse_index(&key, path.len() - 1)?;
            if index > arr.len() {
                return Err(Error::Path(PathError::InvalidPath {
                    message: format!("array index {} out of bounds (len={})", index, arr.len()),
                }));
            }
            arr.insert(index, value);
            Ok(())
        }
        _ => Err(Error::InvalidKey {
            key,
            kind: "a primitive value",
        }),
    }
}

/// Replace the existing value at the given path.
pub fn replace_path(tree: &mut Value, path: &DocPath, value: Value) -> Result<(), Error> {
    let slot = get_path_mut(tree, path)?.ok_or_else(|| Error::NotFound { path: path.clone() })?;
    *slot = value;
    Ok(())
}

/// Remove the value at the given path, returning it.
pub fn delete_path(tree: &mut Value, path: &DocPath) -> Result<Value, Error> {
    let (parent, key) = parent_mut(tree, path)?;
    let removed = match parent {
        Value::Object(map) => map.shift_remove(&key),
        Value::Array(arr) => {
            let index = parse_index(&key, path.len() - 1)?;
            (index < arr.len()).then(|| arr.remove(index))
        }
        _ => None,
    };
    removed.ok_or_else(|| Error::NotFound { path: path.clone() })
}
