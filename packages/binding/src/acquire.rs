//! Bounded-retry acquisition of the session-bound SDK.

use std::sync::{Arc, OnceLock};

use docsync_core::Error;
use docsync_sdk::Sdk;

use crate::config::AcquireConfig;
use crate::registry::BindingSource;

/// Obtains the host's session from a [`BindingSource`], tolerating a host
/// that is still starting up.
///
/// The first successful acquisition builds the one [`Sdk`] this acquirer
/// will ever hand out; every later call returns it without polling.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use docsync_binding::{Acquirer, BindingRegistry};
/// use docsync_json_store::InMemorySession;
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let registry = BindingRegistry::new();
/// registry.publish("sdk", Arc::new(InMemorySession::new()));
///
/// let acquirer = Acquirer::new(&registry);
/// let sdk = acquirer.acquire().await.expect("published above");
/// assert!(Arc::ptr_eq(&sdk, &acquirer.acquire().await.unwrap()));
/// # });
/// ```
pub struct Acquirer<S> {
    source: S,
    config: AcquireConfig,
    sdk: OnceLock<Arc<Sdk>>,
}

impl<S: BindingSource> Acquirer<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, AcquireConfig::default())
    }

    pub fn with_config(source: S, config: AcquireConfig) -> Self {
        Self {
            source,
            config,
            sdk: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &AcquireConfig {
        &self.config
    }

    /// The SDK, if it has already been acquired.
    pub fn cached(&self) -> Option<Arc<Sdk>> {
        self.sdk.get().cloned()
    }

    /// Poll for the published session, at most `max_attempts` times with
    /// `interval` between attempts.
    ///
    /// Returns `None` once the bound is exhausted; the host may simply not
    /// be ready yet, and a later call polls afresh.
    pub async fn acquire(&self) -> Option<Arc<Sdk>> {
        if let Some(sdk) = self.sdk.get() {
            return Some(sdk.clone());
        }

        let environment = self.environment();
        let key = &self.config.key;
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            if let Some(session) = self.source.lookup(&environment, key) {
                log::debug!(
                    "Acquired binding '{}' in environment '{}' after {} attempt(s)",
                    key,
                    environment,
                    attempt
                );
                let sdk = self.sdk.get_or_init(|| Arc::new(Sdk::new(session)));
                return Some(sdk.clone());
            }

            log::trace!("Binding '{}' not published yet (attempt {})", key, attempt);
            if attempt < max_attempts {
                tokio::time::sleep(self.config.interval()).await;
            }
        }

        log::warn!(
            "Binding '{}' unavailable in environment '{}' after {} attempts",
            key,
            environment,
            max_attempts
        );
        None
    }

    /// Like [`Acquirer::acquire`], with exhaustion reported as
    /// [`Error::BindingUnavailable`].
    pub async fn try_acquire(&self) -> Result<Arc<Sdk>, Error> {
        match self.acquire().await {
            Some(sdk) => Ok(sdk),
            None => Err(Error::BindingUnavailable {
                environment: self.environment(),
                key: self.config.key.clone(),
                attempts: self.config.max_attempts,
            }),
        }
    }

    fn environment(&self) -> String {
        self.config
            .environment
            .clone()
            .unwrap_or_else(|| self.source.current_environment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BindingRegistry;
    use docsync_core::SharedSession;
    use docsync_json_store::InMemorySession;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Never publishes anything; counts lookups.
    #[derive(Default)]
    struct EmptySource {
        lookups: AtomicU32,
    }

    impl BindingSource for EmptySource {
        fn current_environment(&self) -> String {
            "default".to_string()
        }

        fn lookup(&self, _environment: &str, _key: &str) -> Option<SharedSession> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    /// Publishes on the given lookup.
    struct LateSource {
        lookups: AtomicU32,
        ready_at: u32,
        session: SharedSession,
    }

    impl BindingSource for LateSource {
        fn current_environment(&self) -> String {
            "default".to_string()
        }

        fn lookup(&self, _environment: &str, _key: &str) -> Option<SharedSession> {
            let n = self.lookups.fetch_add(1, Ordering::SeqCst) + 1;
            (n >= self.ready_at).then(|| self.session.clone())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_none_after_exactly_the_bound() {
        let source = EmptySource::default();
        let acquirer = Acquirer::new(&source);

        let started = tokio::time::Instant::now();
        assert!(acquirer.acquire().await.is_none());

        assert_eq!(source.lookups.load(Ordering::SeqCst), 1000);
        assert!(started.elapsed() >= Duration::from_millis(999));
        assert!(acquirer.cached().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn try_acquire_reports_unavailable() {
        let source = EmptySource::default();
        let config = AcquireConfig {
            max_attempts: 5,
            ..AcquireConfig::default()
        };
        let acquirer = Acquirer::with_config(&source, config);

        let err = acquirer.try_acquire().await.unwrap_err();
        assert!(matches!(
            err,
            Error::BindingUnavailable { attempts: 5, .. }
        ));
        assert_eq!(source.lookups.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn late_publish_is_picked_up() {
        let source = LateSource {
            lookups: AtomicU32::new(0),
            ready_at: 40,
            session: Arc::new(InMemorySession::new()),
        };
        let acquirer = Acquirer::new(&source);

        assert!(acquirer.acquire().await.is_some());
        assert_eq!(source.lookups.load(Ordering::SeqCst), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn cached_sdk_is_returned_without_polling() {
        let source = LateSource {
            lookups: AtomicU32::new(0),
            ready_at: 1,
            session: Arc::new(InMemorySession::new()),
        };
        let acquirer = Acquirer::new(&source);

        let first = acquirer.acquire().await.unwrap();
        let second = acquirer.acquire().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &acquirer.cached().unwrap()));
        assert_eq!(source.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn registry_publish_during_polling() {
        let registry = Arc::new(BindingRegistry::new());
        let acquirer = Acquirer::new(registry.clone());

        let publisher = {
            let registry = registry.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(25)).await;
                registry.publish("sdk", Arc::new(InMemorySession::new()));
            })
        };

        let sdk = acquirer.acquire().await;
        publisher.await.unwrap();
        assert!(sdk.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn configured_environment_wins() {
        let registry = BindingRegistry::new();
        registry.publish_in("qa", "sdk", Arc::new(InMemorySession::new()));

        let default_env = Acquirer::with_config(
            &registry,
            AcquireConfig {
                max_attempts: 3,
                ..AcquireConfig::default()
            },
        );
        assert!(default_env.acquire().await.is_none());

        let qa = Acquirer::with_config(
            &registry,
            AcquireConfig {
                environment: Some("qa".to_string()),
                ..AcquireConfig::default()
            },
        );
        assert!(qa.acquire().await.is_some());
    }
}
