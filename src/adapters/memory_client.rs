// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process remote configuration client.
//!
//! Stands in for a real dynamic configuration service when embedding the
//! overlay in tests or single-process tools. Publishing a namespace diffs
//! the old and new snapshots and delivers the resulting change event to
//! that namespace's subscribers.

use crate::adapters::namespace_source::{NamespaceSource, SharedSnapshot};
use crate::domain::{ConfigChangeEvent, ConfigError, Result};
use crate::ports::{ConfigChangeListener, PropertySource, RemoteConfigClient};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

#[derive(Default)]
struct NamespaceEntry {
    state: SharedSnapshot,
    listeners: RwLock<Vec<Arc<dyn ConfigChangeListener>>>,
    // Held for the whole of a publish so one namespace delivers in order.
    delivery: Mutex<()>,
}

/// A [`RemoteConfigClient`] backed by process memory.
///
/// Unknown namespaces are created empty on first use. Delivery is
/// synchronous on the publishing thread and serialized per namespace, so a
/// listener must not publish to the namespace it is handling.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::adapters::InMemoryConfigClient;
/// use overlaycfg::domain::ConfigChangeEvent;
/// use overlaycfg::ports::RemoteConfigClient;
/// use std::sync::{Arc, Mutex};
///
/// let client = InMemoryConfigClient::new();
/// client.publish("app", [("timeout", "30")]);
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// client
///     .subscribe("app", Arc::new(move |event: &ConfigChangeEvent| {
///         sink.lock().unwrap().push(event.len());
///     }))
///     .unwrap();
///
/// client.publish("app", [("timeout", "45"), ("retries", "3")]);
/// assert_eq!(*seen.lock().unwrap(), vec![2]);
/// ```
#[derive(Default)]
pub struct InMemoryConfigClient {
    namespaces: RwLock<HashMap<String, Arc<NamespaceEntry>>>,
    unavailable: RwLock<HashSet<String>>,
}

impl InMemoryConfigClient {
    /// Creates a client with no namespaces.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, namespace: &str) -> Arc<NamespaceEntry> {
        if let Some(entry) = self
            .namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
        {
            return Arc::clone(entry);
        }

        let mut namespaces = self
            .namespaces
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(namespaces.entry(namespace.to_string()).or_default())
    }

    /// Replaces the contents of `namespace` and notifies its subscribers.
    ///
    /// Returns the computed change event. Subscribers are not called when
    /// nothing changed.
    pub fn publish<I, K, V>(&self, namespace: &str, values: I) -> ConfigChangeEvent
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values: BTreeMap<String, String> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let entry = self.entry(namespace);
        let _turn = entry.delivery.lock().unwrap_or_else(PoisonError::into_inner);

        let event = {
            let mut snapshot = entry.state.write().unwrap_or_else(PoisonError::into_inner);
            let old = snapshot.replace(values);
            ConfigChangeEvent::diff(namespace, &old, snapshot.values())
        };

        if event.is_empty() {
            tracing::debug!("Publish to namespace '{}' changed nothing", namespace);
            return event;
        }

        let listeners: Vec<_> = entry
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        tracing::debug!(
            "Delivering {} change(s) in namespace '{}' to {} listener(s)",
            event.len(),
            namespace,
            listeners.len()
        );
        for listener in listeners {
            listener.on_change(&event);
        }

        event
    }

    /// Marks `namespace` as unreachable (or reachable again).
    pub fn set_unavailable(&self, namespace: &str, unavailable: bool) {
        let mut set = self
            .unavailable
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if unavailable {
            set.insert(namespace.to_string());
        } else {
            set.remove(namespace);
        }
    }

    /// The current revision of `namespace`, if it exists.
    pub fn revision(&self, namespace: &str) -> Option<u64> {
        let namespaces = self
            .namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        namespaces.get(namespace).map(|entry| {
            entry
                .state
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .revision()
        })
    }

    /// Number of listeners subscribed to `namespace`.
    pub fn listener_count(&self, namespace: &str) -> usize {
        let namespaces = self
            .namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        namespaces.get(namespace).map_or(0, |entry| {
            entry
                .listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        })
    }
}

impl RemoteConfigClient for InMemoryConfigClient {
    fn get_config(&self, namespace: &str) -> Result<Arc<dyn PropertySource>> {
        let unavailable = self
            .unavailable
            .read()
            .map_err(|_| ConfigError::poisoned("in-memory-client"))?
            .contains(namespace);
        if unavailable {
            return Err(ConfigError::NamespaceUnavailable {
                namespace: namespace.to_string(),
                message: "namespace marked unavailable".to_string(),
                source: None,
            });
        }

        let entry = self.entry(namespace);
        Ok(Arc::new(NamespaceSource::new(
            namespace,
            Arc::clone(&entry.state),
        )))
    }

    fn subscribe(&self, namespace: &str, listener: Arc<dyn ConfigChangeListener>) -> Result<()> {
        let entry = self.entry(namespace);
        entry
            .listeners
            .write()
            .map_err(|_| ConfigError::poisoned(namespace))?
            .push(listener);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryConfigClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let namespaces: Vec<String> = self
            .namespaces
            .read()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("InMemoryConfigClient")
            .field("namespaces", &namespaces)
            .finish()
    }
}
