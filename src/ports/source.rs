// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property source trait definition.
//!
//! A property source is one named layer of key-value configuration: a local
//! file, a remote namespace, or a chain of other layers.

use crate::domain::{ConfigKey, ConfigValue, Result};

/// A named, read-only layer of configuration.
///
/// Layers never mutate each other. A missing key is `Ok(None)`, never an
/// error; `Err` is reserved for a layer that cannot serve lookups at all.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the composed stack is read from
/// the application and from change-delivery threads at the same time.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::ports::PropertySource;
/// use overlaycfg::domain::{ConfigKey, ConfigValue, Result};
///
/// struct Fixed;
///
/// impl PropertySource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
///         Ok((key.as_str() == "answer").then(|| ConfigValue::from("42")))
///     }
///
///     fn keys(&self) -> Result<Vec<ConfigKey>> {
///         Ok(vec![ConfigKey::from("answer")])
///     }
/// }
///
/// assert_eq!(Fixed.get_str("answer").unwrap().unwrap().as_str(), "42");
/// assert!(Fixed.contains_key(&ConfigKey::from("answer")));
/// ```
pub trait PropertySource: Send + Sync {
    /// Returns the name of this layer.
    ///
    /// Names are unique within a stack or chain and are used for positional
    /// insertion and for logging.
    fn name(&self) -> &str;

    /// Retrieves the value this layer holds for `key`.
    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>>;

    /// Returns every key this layer defines.
    fn keys(&self) -> Result<Vec<ConfigKey>>;

    /// Retrieves a value for a string key.
    fn get_str(&self, key: &str) -> Result<Option<ConfigValue>> {
        self.get(&ConfigKey::from(key))
    }

    /// Whether this layer defines `key`. Lookup errors count as absent.
    fn contains_key(&self, key: &ConfigKey) -> bool {
        matches!(self.get(key), Ok(Some(_)))
    }
}
