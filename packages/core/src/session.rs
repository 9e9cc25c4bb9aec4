//! The remote session boundary.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{DocPath, Error};

/// Listener payloads for one node, keyed by event type.
pub type Listeners = BTreeMap<String, Vec<String>>;

/// Point reads and writes against the authoritative, path-addressed document.
///
/// Values cross this boundary as JSON text. Implementations use interior
/// mutability: a session is shared between the SDK façade and every document
/// opened from it.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn RemoteSession>`.
pub trait RemoteSession: Send + Sync {
    /// Fetch the full document as JSON text.
    fn design_document(&self) -> Result<String, Error>;

    /// Read a single value.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - Nothing exists at the path.
    /// * `Ok(Some(json))` - The value at the path.
    /// * `Err(Error)` - An error occurred.
    fn value_at(&self, path: &DocPath) -> Result<Option<String>, Error>;

    /// Create a new field or element at `path`.
    fn add_at(&self, path: &DocPath, value: &str) -> Result<(), Error>;

    /// Overwrite the existing field or element at `path`.
    fn update_at(&self, path: &DocPath, value: &str) -> Result<(), Error>;

    /// Remove the field or element at `path`.
    fn delete_at(&self, path: &DocPath) -> Result<(), Error>;

    fn add_event_listener(
        &self,
        _path: &DocPath,
        _event_type: &str,
        _listener: &str,
    ) -> Result<(), Error> {
        Err(Error::NotSupported {
            operation: "add_event_listener",
        })
    }

    fn remove_event_listener(
        &self,
        _path: &DocPath,
        _event_type: &str,
        _listener: &str,
    ) -> Result<(), Error> {
        Err(Error::NotSupported {
            operation: "remove_event_listener",
        })
    }

    fn event_listeners(&self, _path: &DocPath) -> Result<Listeners, Error> {
        Err(Error::NotSupported {
            operation: "event_listeners",
        })
    }
}

/// A session handle shared by reference.
pub type SharedSession = Arc<dyn RemoteSession>;

// Blanket implementations for references and smart pointers

macro_rules! forward_session {
    ($($ty:ty),*) => {
        $(
            impl<T: RemoteSession + ?Sized> RemoteSession for $ty {
                fn design_document(&self) -> Result<String, Error> {
                    (**self).design_document()
                }

                fn value_at(&self, path: &DocPath) -> Result<Option<String>, Error> {
                    (**self).value_at(path)
                }

                fn add_at(&self, path: &DocPath, value: &str) -> Result<(), Error> {
                    (**self).add_at(path, value)
                }

                fn update_at(&self, path: &DocPath, value: &str) -> Result<(), Error> {
                    (**self).update_at(path, value)
                }

                fn delete_at(&self, path: &DocPath) -> Result<(), Error> {
                    (**self).delete_at(path)
                }

                fn add_event_listener(
                    &self,
                    path: &DocPath,
                    event_type: &str,
                    listener: &str,
                ) -> Result<(), Error> {
                    (**self).add_event_listener(path, event_type, listener)
                }

                fn remove_event_listener(
                    &self,
                    path: &DocPath,
                    event_type: &str,
                    listener: &str,
                ) -> Result<(), Error> {
                    (**self).remove_event_listener(path, event_type, listener)
                }

                fn event_listeners(&self, path: &DocPath) -> Result<Listeners, Error> {
                    (**self).event_listeners(path)
                }
            }
        )*
    };
}

forward_session!(&T, Box<T>, Arc<T>);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Flat map session for testing.
    struct TestSession {
        data: Mutex<HashMap<DocPath, String>>,
    }

    impl TestSession {
        fn new() -> Self {
            Self {
                data: Mutex::new(HashMap::new()),
            }
        }
    }

    impl RemoteSession for TestSession {
        fn design_document(&self) -> Result<String, Error> {
            Ok("{}".to_string())
        }

        fn value_at(&self, path: &DocPath) -> Result<Option<String>, Error> {
            Ok(self.data.lock().unwrap().get(path).cloned())
        }

        fn add_at(&self, path: &DocPath, value: &str) -> Result<(), Error> {
            self.data
                .lock()
                .unwrap()
                .insert(path.clone(), value.to_string());
            Ok(())
        }

        fn update_at(&self, path: &DocPath, value: &str) -> Result<(), Error> {
            self.add_at(path, value)
        }

        fn delete_at(&self, path: &DocPath) -> Result<(), Error> {
            self.data.lock().unwrap().remove(path);
            Ok(())
        }
    }

    #[test]
    fn basic_session_works() {
        let session = TestSession::new();
        let path = DocPath::root().child("name");

        session.add_at(&path, "\"Alice\"").unwrap();
        assert_eq!(
            session.value_at(&path).unwrap(),
            Some("\"Alice\"".to_string())
        );

        session.delete_at(&path).unwrap();
        assert_eq!(session.value_at(&path).unwrap(), None);
    }

    #[test]
    fn object_safety_works() {
        let shared: SharedSession = Arc::new(TestSession::new());
        let path = DocPath::root().child("test");

        shared.update_at(&path, "1").unwrap();
        assert!(shared.value_at(&path).unwrap().is_some());
    }

    #[test]
    fn listeners_unsupported_by_default() {
        let session = TestSession::new();
        let err = session
            .add_event_listener(&DocPath::root(), "click", "noop")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotSupported {
                operation: "add_event_listener"
            }
        ));
        assert!(session.event_listeners(&DocPath::root()).is_err());
    }
}
