//! Acquisition settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use docsync_core::Error;

/// How acquisition polls for the published session.
///
/// Every field has a default, so partial JSON such as
/// `{"max_attempts": 50}` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquireConfig {
    /// Environment to look in. `None` means the registry's active one at
    /// the time of acquisition.
    pub environment: Option<String>,
    /// Key the host publishes its handle under.
    pub key: String,
    pub max_attempts: u32,
    /// Pause between attempts, in milliseconds.
    pub interval_ms: u64,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            environment: None,
            key: "sdk".to_string(),
            max_attempts: 1000,
            interval_ms: 1,
        }
    }
}

impl AcquireConfig {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
