// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered chain of property layers resolved first-hit-wins.

use crate::domain::{ConfigKey, ConfigValue, Result};
use crate::ports::PropertySource;
use std::collections::BTreeSet;
use std::sync::Arc;

struct Layer {
    priority: i32,
    source: Arc<dyn PropertySource>,
}

/// An ordered list of layers with explicit integer priorities.
///
/// Lower priority numbers take precedence. Layers with equal priority keep
/// the order in which they were added. Layer names are unique within a
/// chain; adding a second layer with a name already present is ignored.
///
/// The chain caches nothing: every lookup reads the layers' current state,
/// so live namespace views stay live.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::adapters::MapSource;
/// use overlaycfg::domain::ConfigKey;
/// use overlaycfg::service::SourceChain;
/// use std::sync::Arc;
///
/// let mut chain = SourceChain::new("composed");
/// chain.add_layer(2, Arc::new(MapSource::from_pairs("common", [("timeout", "10"), ("retries", "3")])));
/// chain.add_layer(1, Arc::new(MapSource::from_pairs("app", [("timeout", "30")])));
///
/// assert_eq!(chain.resolve(&ConfigKey::from("timeout")).unwrap(), "30");
/// assert_eq!(chain.resolve(&ConfigKey::from("retries")).unwrap(), "3");
/// assert!(chain.resolve(&ConfigKey::from("missing")).is_none());
/// ```
pub struct SourceChain {
    name: String,
    layers: Vec<Layer>,
}

impl SourceChain {
    /// Creates an empty chain.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
        }
    }

    /// Adds `source` behind every layer whose priority is less than or
    /// equal to `priority`. Returns `false` if a layer with the same name is
    /// already in the chain.
    pub fn add_layer(&mut self, priority: i32, source: Arc<dyn PropertySource>) -> bool {
        if self.layers.iter().any(|l| l.source.name() == source.name()) {
            tracing::debug!(
                "Layer '{}' already present in chain '{}'; keeping the first",
                source.name(),
                self.name
            );
            return false;
        }
        let pos = self.layers.partition_point(|l| l.priority <= priority);
        self.layers.insert(pos, Layer { priority, source });
        true
    }

    /// Returns the value from the first layer that defines `key`.
    ///
    /// A layer that fails the lookup is logged and skipped.
    pub fn resolve(&self, key: &ConfigKey) -> Option<ConfigValue> {
        for layer in &self.layers {
            match layer.source.get(key) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!(
                        "Error querying layer '{}' for key '{}': {}",
                        layer.source.name(),
                        key,
                        e
                    );
                }
            }
        }
        None
    }

    /// Layer names in precedence order.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.source.name()).collect()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the chain has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl PropertySource for SourceChain {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self.resolve(key))
    }

    fn keys(&self) -> Result<Vec<ConfigKey>> {
        let mut keys = BTreeSet::new();
        for layer in &self.layers {
            keys.extend(layer.source.keys()?);
        }
        Ok(keys.into_iter().collect())
    }
}

impl std::fmt::Debug for SourceChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceChain")
            .field("name", &self.name)
            .field("layers", &self.layer_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryConfigClient, MapSource};
    use crate::ports::RemoteConfigClient;

    fn layer(name: &str, pairs: &[(&str, &str)]) -> Arc<dyn PropertySource> {
        Arc::new(MapSource::from_pairs(name, pairs.iter().copied()))
    }

    #[test]
    fn test_lower_priority_number_wins() {
        let mut chain = SourceChain::new("c");
        chain.add_layer(2, layer("low", &[("k", "low")]));
        chain.add_layer(1, layer("high", &[("k", "high")]));
        assert_eq!(chain.resolve(&ConfigKey::from("k")).unwrap(), "high");
        assert_eq!(chain.layer_names(), vec!["high", "low"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut chain = SourceChain::new("c");
        chain.add_layer(1, layer("first", &[("k", "1")]));
        chain.add_layer(0, layer("top", &[]));
        chain.add_layer(1, layer("second", &[("k", "2")]));
        assert_eq!(chain.layer_names(), vec!["top", "first", "second"]);
        assert_eq!(chain.resolve(&ConfigKey::from("k")).unwrap(), "1");
    }

    #[test]
    fn test_duplicate_names_are_ignored() {
        let mut chain = SourceChain::new("c");
        assert!(chain.add_layer(1, layer("app", &[("k", "1")])));
        assert!(!chain.add_layer(0, layer("app", &[("k", "2")])));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.resolve(&ConfigKey::from("k")).unwrap(), "1");
    }

    #[test]
    fn test_resolve_reflects_live_layers() {
        let client = InMemoryConfigClient::new();
        client.publish("app", [("timeout", "30")]);
        client.publish("common", [("timeout", "10")]);

        let mut chain = SourceChain::new("c");
        chain.add_layer(1, client.get_config("app").unwrap());
        chain.add_layer(2, client.get_config("common").unwrap());
        assert_eq!(chain.resolve(&ConfigKey::from("timeout")).unwrap(), "30");

        client.publish("app", Vec::<(String, String)>::new());
        assert_eq!(chain.resolve(&ConfigKey::from("timeout")).unwrap(), "10");
    }

    #[test]
    fn test_keys_are_union_of_layers() {
        let mut chain = SourceChain::new("c");
        chain.add_layer(1, layer("a", &[("x", "1"), ("y", "1")]));
        chain.add_layer(2, layer("b", &[("y", "2"), ("z", "2")]));
        let keys: Vec<String> = chain
            .keys()
            .unwrap()
            .into_iter()
            .map(ConfigKey::into_string)
            .collect();
        assert_eq!(keys, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_empty_chain() {
        let chain = SourceChain::new("c");
        assert!(chain.is_empty());
        assert!(chain.get_str("anything").unwrap().is_none());
    }
}
