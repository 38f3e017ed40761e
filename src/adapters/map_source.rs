// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable in-memory property layer.

use crate::domain::{ConfigKey, ConfigValue, Result};
use crate::ports::PropertySource;
use std::collections::BTreeMap;

/// A fixed set of key-value pairs under a name.
///
/// Local discovery produces one of these per file found. Hosts also use it
/// for bootstrap or default layers.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::adapters::MapSource;
/// use overlaycfg::ports::PropertySource;
///
/// let source = MapSource::from_pairs("defaults", [("retries", "3")]);
/// assert_eq!(source.name(), "defaults");
/// assert_eq!(source.get_str("retries").unwrap().unwrap().as_str(), "3");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapSource {
    name: String,
    values: BTreeMap<String, String>,
}

impl MapSource {
    /// Creates a layer from an owned map.
    pub fn new(name: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Creates a layer from any iterator of pairs.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            name,
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Number of keys in this layer.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether this layer is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PropertySource for MapSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self
            .values
            .get(key.as_str())
            .map(|v| ConfigValue::from(v.as_str())))
    }

    fn keys(&self) -> Result<Vec<ConfigKey>> {
        Ok(self
            .values
            .keys()
            .map(|k| ConfigKey::from(k.as_str()))
            .collect())
    }
}
