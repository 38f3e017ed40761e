// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live read view over one remote namespace.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, Result};
use crate::ports::PropertySource;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// The backing state of a namespace, owned by the remote client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespaceSnapshot {
    values: BTreeMap<String, String>,
    revision: u64,
}

impl NamespaceSnapshot {
    /// Creates a snapshot at revision 0.
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values, revision: 0 }
    }

    /// The current key-value pairs.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Increases every time the values are replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Swaps in new values, bumps the revision and returns the old values.
    pub fn replace(&mut self, values: BTreeMap<String, String>) -> BTreeMap<String, String> {
        self.revision += 1;
        std::mem::replace(&mut self.values, values)
    }
}

/// Shared handle to a namespace's backing state.
pub type SharedSnapshot = Arc<RwLock<NamespaceSnapshot>>;

/// A [`PropertySource`] that reads a namespace's current state on every
/// lookup. It wraps the client's state rather than copying it, so updates
/// published by the client are visible immediately.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::adapters::{NamespaceSnapshot, NamespaceSource};
/// use overlaycfg::ports::PropertySource;
/// use std::collections::BTreeMap;
/// use std::sync::{Arc, RwLock};
///
/// let state = Arc::new(RwLock::new(NamespaceSnapshot::default()));
/// let source = NamespaceSource::new("app", Arc::clone(&state));
/// assert!(source.get_str("timeout").unwrap().is_none());
///
/// state
///     .write()
///     .unwrap()
///     .replace(BTreeMap::from([("timeout".to_string(), "30".to_string())]));
/// assert_eq!(source.get_str("timeout").unwrap().unwrap().as_str(), "30");
/// assert_eq!(source.revision().unwrap(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct NamespaceSource {
    namespace: String,
    state: SharedSnapshot,
}

impl NamespaceSource {
    /// Creates a view named `namespace` over `state`.
    pub fn new(namespace: impl Into<String>, state: SharedSnapshot) -> Self {
        Self {
            namespace: namespace.into(),
            state,
        }
    }

    /// The namespace this view reads.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The revision of the backing state at the time of the call.
    pub fn revision(&self) -> Result<u64> {
        self.state
            .read()
            .map(|snapshot| snapshot.revision())
            .map_err(|_| ConfigError::poisoned(&self.namespace))
    }
}

impl PropertySource for NamespaceSource {
    fn name(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        let snapshot = self
            .state
            .read()
            .map_err(|_| ConfigError::poisoned(&self.namespace))?;
        Ok(snapshot
            .values()
            .get(key.as_str())
            .map(|v| ConfigValue::from(v.as_str())))
    }

    fn keys(&self) -> Result<Vec<ConfigKey>> {
        let snapshot = self
            .state
            .read()
            .map_err(|_| ConfigError::poisoned(&self.namespace))?;
        Ok(snapshot
            .values()
            .keys()
            .map(|k| ConfigKey::from(k.as_str()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(pairs: &[(&str, &str)]) -> SharedSnapshot {
        let values = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(RwLock::new(NamespaceSnapshot::new(values)))
    }

    #[test]
    fn test_reads_through_to_state() {
        let state = shared(&[("a", "1")]);
        let source = NamespaceSource::new("ns", Arc::clone(&state));
        assert_eq!(source.get_str("a").unwrap().unwrap(), "1");

        state.write().unwrap().replace(BTreeMap::new());
        assert!(source.get_str("a").unwrap().is_none());
    }

    #[test]
    fn test_keys_are_sorted() {
        let source = NamespaceSource::new("ns", shared(&[("b", "2"), ("a", "1")]));
        let keys: Vec<String> = source
            .keys()
            .unwrap()
            .into_iter()
            .map(ConfigKey::into_string)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_revision_increases_on_replace() {
        let state = shared(&[]);
        let source = NamespaceSource::new("ns", Arc::clone(&state));
        assert_eq!(source.revision().unwrap(), 0);
        let old = state.write().unwrap().replace(BTreeMap::from([(
            "k".to_string(),
            "v".to_string(),
        )]));
        assert!(old.is_empty());
        state.write().unwrap().replace(BTreeMap::new());
        assert_eq!(source.revision().unwrap(), 2);
    }

    #[test]
    fn test_poisoned_lock_surfaces_as_error() {
        let state = shared(&[("a", "1")]);
        let source = NamespaceSource::new("ns", Arc::clone(&state));

        let poisoner = Arc::clone(&state);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(
            source.get_str("a"),
            Err(ConfigError::SourceError { .. })
        ));
        assert!(source.revision().is_err());
    }
}
