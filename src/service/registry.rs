// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prefix registry mapping configuration keys to interested consumers.

use crate::domain::ConfigKey;
use crate::ports::Rebindable;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Maps key prefixes to the consumers bound under them.
///
/// A consumer registered under prefix `p` is interested in every key that
/// starts with `p`, compared as plain strings (`"db."` matches `"db.url"`,
/// and `"db"` matches `"dbname"`). The empty prefix matches every key.
///
/// Prefixes are kept sorted, so a lookup checks one entry per leading
/// substring of the key instead of scanning every registration. Lookups may
/// race with late registrations.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::domain::ConfigKey;
/// use overlaycfg::ports::{RebindFn, Rebindable};
/// use overlaycfg::service::ChangeRegistry;
/// use std::sync::Arc;
///
/// let registry = ChangeRegistry::new();
/// let pool: Arc<dyn Rebindable> = Arc::new(RebindFn::new("pool", |_env| Ok(())));
/// registry.register("db.", pool);
///
/// assert_eq!(registry.lookup(&ConfigKey::from("db.url")).len(), 1);
/// assert!(registry.lookup(&ConfigKey::from("http.port")).is_empty());
/// ```
#[derive(Default)]
pub struct ChangeRegistry {
    entries: RwLock<BTreeMap<String, Vec<Arc<dyn Rebindable>>>>,
}

fn same_consumer(a: &Arc<dyn Rebindable>, b: &Arc<dyn Rebindable>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl ChangeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `consumer` under `prefix`.
    ///
    /// Returns `false` if this exact consumer is already registered under
    /// this prefix.
    pub fn register(&self, prefix: impl Into<String>, consumer: Arc<dyn Rebindable>) -> bool {
        let prefix = prefix.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let consumers = entries.entry(prefix).or_default();
        if consumers.iter().any(|c| same_consumer(c, &consumer)) {
            return false;
        }
        consumers.push(consumer);
        true
    }

    /// Every consumer registered under a prefix of `key`.
    ///
    /// Shorter prefixes come first, and within a prefix consumers keep their
    /// registration order. A consumer reachable through several matching
    /// prefixes appears once.
    pub fn lookup(&self, key: &ConfigKey) -> Vec<Arc<dyn Rebindable>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut found: Vec<Arc<dyn Rebindable>> = Vec::new();
        for prefix in key.prefixes() {
            if let Some(consumers) = entries.get(prefix) {
                for consumer in consumers {
                    if !found.iter().any(|c| same_consumer(c, consumer)) {
                        found.push(Arc::clone(consumer));
                    }
                }
            }
        }
        found
    }

    /// Number of distinct registered prefixes.
    pub fn prefix_count(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of (prefix, consumer) registrations.
    pub fn consumer_count(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.prefix_count() == 0
    }
}

impl std::fmt::Debug for ChangeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut map = f.debug_map();
        for (prefix, consumers) in entries.iter() {
            let names: Vec<&str> = consumers.iter().map(|c| c.name()).collect();
            map.entry(prefix, &names);
        }
        map.finish()
    }
}
