//! Environment-scoped publish/lookup of session handles.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use docsync_core::SharedSession;

/// Name of the environment a fresh registry starts in.
pub const DEFAULT_ENVIRONMENT: &str = "default";

lazy_static::lazy_static! {
    static ref GLOBAL: BindingRegistry = BindingRegistry::new();
}

#[derive(Default)]
struct Inner {
    current: String,
    environments: HashMap<String, HashMap<String, SharedSession>>,
}

/// Where acquisition looks for a published session.
///
/// Implemented by [`BindingRegistry`]; tests substitute their own.
pub trait BindingSource: Send + Sync {
    fn current_environment(&self) -> String;

    fn lookup(&self, environment: &str, key: &str) -> Option<SharedSession>;
}

/// Process-scoped store the host runtime publishes its session handle into.
///
/// Handles live in per-environment namespaces. A namespace is created the
/// first time it is touched, by a publish, a lookup or a switch, and nothing
/// is ever torn down.
pub struct BindingRegistry {
    inner: RwLock<Inner>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        let mut environments = HashMap::new();
        environments.insert(DEFAULT_ENVIRONMENT.to_string(), HashMap::new());
        Self {
            inner: RwLock::new(Inner {
                current: DEFAULT_ENVIRONMENT.to_string(),
                environments,
            }),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static BindingRegistry {
        &GLOBAL
    }

    /// Switch the active environment, creating its namespace if needed.
    pub fn set_environment(&self, name: &str) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.environments.entry(name.to_string()).or_default();
        inner.current = name.to_string();
    }

    pub fn current_environment(&self) -> String {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    /// Publish `handle` under `key` in the active environment.
    pub fn publish(&self, key: &str, handle: SharedSession) {
        let environment = self.current_environment();
        self.publish_in(&environment, key, handle);
    }

    pub fn publish_in(&self, environment: &str, key: &str, handle: SharedSession) {
        log::debug!(
            "Publishing binding '{}' in environment '{}'",
            key,
            environment
        );
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .environments
            .entry(environment.to_string())
            .or_default()
            .insert(key.to_string(), handle);
    }

    /// Look `key` up in the active environment.
    pub fn get(&self, key: &str) -> Option<SharedSession> {
        let environment = self.current_environment();
        self.get_in(&environment, key)
    }

    pub fn get_in(&self, environment: &str, key: &str) -> Option<SharedSession> {
        {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(namespace) = inner.environments.get(environment) {
                return namespace.get(key).cloned();
            }
        }

        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .environments
            .entry(environment.to_string())
            .or_default()
            .get(key)
            .cloned()
    }

    /// Known environment names, sorted.
    pub fn environments(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = inner.environments.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingSource for BindingRegistry {
    fn current_environment(&self) -> String {
        BindingRegistry::current_environment(self)
    }

    fn lookup(&self, environment: &str, key: &str) -> Option<SharedSession> {
        self.get_in(environment, key)
    }
}

impl<T: BindingSource + ?Sized> BindingSource for &T {
    fn current_environment(&self) -> String {
        (**self).current_environment()
    }

    fn lookup(&self, environment: &str, key: &str) -> Option<SharedSession> {
        (**self).lookup(environment, key)
    }
}

impl<T: BindingSource + ?Sized> BindingSource for Arc<T> {
    fn current_environment(&self) -> String {
        (**self).current_environment()
    }

    fn lookup(&self, environment: &str, key: &str) -> Option<SharedSession> {
        (**self).lookup(environment, key)
    }
}
