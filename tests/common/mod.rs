// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared consumers and fixtures for the integration tests.

use overlaycfg::prelude::*;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Records the value of one key every time it is rebound.
#[allow(dead_code)]
pub struct RecordingConsumer {
    name: String,
    key: String,
    seen: Mutex<Vec<Option<String>>>,
}

#[allow(dead_code)]
impl RecordingConsumer {
    pub fn new(name: &str, key: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            key: key.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Values observed so far, one per rebind.
    pub fn seen(&self) -> Vec<Option<String>> {
        self.seen.lock().unwrap().clone()
    }

    pub fn rebind_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Rebindable for RecordingConsumer {
    fn name(&self) -> &str {
        &self.name
    }

    fn rebind(&self, env: &dyn Environment) -> Result<()> {
        let value = env.get_property_str(&self.key).map(ConfigValue::into_string);
        self.seen.lock().unwrap().push(value);
        Ok(())
    }
}

/// Fails every rebind.
#[allow(dead_code)]
pub struct FailingConsumer;

impl Rebindable for FailingConsumer {
    fn name(&self) -> &str {
        "failing"
    }

    fn rebind(&self, _env: &dyn Environment) -> Result<()> {
        Err(ConfigError::RebindFailure {
            consumer: "failing".to_string(),
            message: "refusing to rebind".to_string(),
            source: None,
        })
    }
}

/// Settings with local discovery pointed nowhere.
#[allow(dead_code)]
pub fn remote_only_settings() -> OverlaySettings {
    OverlaySettings::default().with_search_locations(Vec::<PathBuf>::new())
}

/// Installs a test-writer subscriber so logs show up with `--nocapture`.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
