// SPDX-License-Identifier: MIT OR Apache-2.0

//! The host's ordered list of property layers.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, Result};
use crate::ports::{Environment, PropertySource};
use std::sync::{Arc, PoisonError, RwLock};

/// The broader, mutable property stack the overlay inserts into.
///
/// The first layer has the highest precedence. Layer names are unique:
/// inserting a layer whose name is already present replaces the old one at
/// the new position. Lookups and insertions may happen from different
/// threads.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::adapters::MapSource;
/// use overlaycfg::ports::Environment;
/// use overlaycfg::service::PropertyStack;
/// use std::sync::Arc;
///
/// let stack = PropertyStack::new();
/// stack.add_last(Arc::new(MapSource::from_pairs("defaults", [("timeout", "10")])));
/// stack.add_first(Arc::new(MapSource::from_pairs("overrides", [("timeout", "5")])));
///
/// assert_eq!(stack.get_property_str("timeout").unwrap(), "5");
/// assert_eq!(stack.names(), vec!["overrides", "defaults"]);
/// ```
#[derive(Default)]
pub struct PropertyStack {
    sources: RwLock<Vec<Arc<dyn PropertySource>>>,
}

impl PropertyStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    fn remove_named(sources: &mut Vec<Arc<dyn PropertySource>>, name: &str) -> Option<Arc<dyn PropertySource>> {
        let pos = sources.iter().position(|s| s.name() == name)?;
        Some(sources.remove(pos))
    }

    /// Inserts `source` with the highest precedence.
    pub fn add_first(&self, source: Arc<dyn PropertySource>) {
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        Self::remove_named(&mut sources, source.name());
        sources.insert(0, source);
    }

    /// Inserts `source` with the lowest precedence.
    pub fn add_last(&self, source: Arc<dyn PropertySource>) {
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        Self::remove_named(&mut sources, source.name());
        sources.push(source);
    }

    /// Inserts `source` directly behind the layer named `anchor`.
    ///
    /// Fails with `SourceNotFound` if `anchor` is not in the stack.
    pub fn add_after(&self, anchor: &str, source: Arc<dyn PropertySource>) -> Result<()> {
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        if !sources.iter().any(|s| s.name() == anchor) {
            return Err(ConfigError::SourceNotFound {
                name: anchor.to_string(),
            });
        }
        Self::remove_named(&mut sources, source.name());
        // The anchor may have moved if it was just replaced.
        let pos = sources
            .iter()
            .position(|s| s.name() == anchor)
            .map_or(sources.len(), |p| p + 1);
        sources.insert(pos, source);
        Ok(())
    }

    /// Removes and returns the layer named `name`.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn PropertySource>> {
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        Self::remove_named(&mut sources, name)
    }

    /// Whether a layer named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|s| s.name() == name)
    }

    /// Layer names in precedence order.
    pub fn names(&self) -> Vec<String> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.sources.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Environment for PropertyStack {
    fn get_property(&self, key: &ConfigKey) -> Option<ConfigValue> {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        for source in sources.iter() {
            match source.get(key) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!(
                        "Error querying source '{}' for key '{}': {}",
                        source.name(),
                        key,
                        e
                    );
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for PropertyStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyStack")
            .field("sources", &self.names())
            .finish()
    }
}
