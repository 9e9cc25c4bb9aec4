//! Document paths in JSON-pointer form.

use std::fmt;

/// Errors related to path parsing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A `~` in a component is not followed by `0` or `1`.
    #[error("invalid escape in path component '{component}' at position {position}")]
    InvalidEscape { component: String, position: usize },

    /// The path string is invalid.
    #[error("invalid path: {message}")]
    InvalidPath { message: String },
}

/// The canonical address of a value inside a document.
///
/// The root is written `/`. Every other path is a root-relative sequence of
/// keys joined by `/`, with sequence indices written as decimal strings in the
/// same position as a key. Components are escaped per RFC 6901 when formatted
/// (`~` becomes `~0`, `/` becomes `~1`).
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DocPath {
    pub components: Vec<String>,
}

impl DocPath {
    /// The root path, `/`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a pointer string.
    ///
    /// The leading `/` is optional and empty components are ignored, so
    /// `""`, `"/"` and `"//"` all parse to the root.
    ///
    /// ```rust
    /// use docsync_core::DocPath;
    ///
    /// let path = DocPath::parse("/frames/0/name").unwrap();
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(DocPath::parse("a/b/").unwrap(), DocPath::parse("/a/b").unwrap());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let components = s
            .split('/')
            .filter(|c| !c.is_empty())
            .enumerate()
            .map(|(i, c)| unescape_component(c, i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DocPath { components })
    }

    /// Create a path from raw (unescaped) keys.
    pub fn from_components<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DocPath {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.components.iter()
    }

    /// The path of `key` directly under this path.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> DocPath {
        let mut components = self.components.clone();
        components.push(key.into());
        DocPath { components }
    }

    /// The enclosing path, or `None` for the root.
    pub fn parent(&self) -> Option<DocPath> {
        let (_, rest) = self.components.split_last()?;
        Some(DocPath {
            components: rest.to_vec(),
        })
    }

    /// The final key, or `None` for the root.
    pub fn last(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// The string child keys are appended to: `/` for the root, `/a/b/`
    /// otherwise.
    pub fn as_prefix(&self) -> String {
        if self.is_root() {
            return "/".to_string();
        }
        format!("{}/", self)
    }
}

fn unescape_component(component: &str, position: usize) -> Result<String, PathError> {
    if !component.contains('~') {
        return Ok(component.to_string());
    }

    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(PathError::InvalidEscape {
                    component: component.to_string(),
                    position,
                })
            }
        }
    }
    Ok(out)
}

fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // `~` first, otherwise the `~1` produced for `/` would be re-escaped.
    component.replace('~', "~0").replace('/', "~1")
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        for component in &self.components {
            write!(f, "/{}", escape_component(component))?;
        }
        Ok(())
    }
}

impl std::str::FromStr for DocPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocPath::parse(s)
    }
}

/// Macro for creating paths from literals.
///
/// # Example
///
/// ```rust
/// use docsync_core::path;
///
/// let p = path!("/frames/0/name");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::DocPath::parse($s).expect("invalid path literal")
    };
}
