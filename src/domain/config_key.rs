// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration key newtype.
//!
//! Keys are flat strings, conventionally dot-separated (`db.pool.size`).
//! Change registration works on literal string prefixes of keys, not on
//! path segments, so `db.pool` is a prefix of both `db.pool.size` and
//! `db.pools`.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A type-safe wrapper for configuration keys.
///
/// # Examples
///
/// ```
/// use overlaycfg::domain::ConfigKey;
///
/// let key = ConfigKey::from("db.pool.size");
/// assert!(key.has_prefix("db."));
/// assert!(!key.has_prefix("cache."));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if `prefix` is a literal leading substring of this key.
    ///
    /// The empty prefix matches every key.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Iterates over every literal prefix of this key, shortest first.
    ///
    /// The empty string and the full key are both included. Prefixes are cut
    /// on character boundaries only.
    ///
    /// ```
    /// use overlaycfg::domain::ConfigKey;
    ///
    /// let key = ConfigKey::from("a.b");
    /// let prefixes: Vec<&str> = key.prefixes().collect();
    /// assert_eq!(prefixes, vec!["", "a", "a.", "a.b"]);
    /// ```
    pub fn prefixes(&self) -> impl Iterator<Item = &str> + '_ {
        self.0
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(self.0.len()))
            .map(move |end| &self.0[..end])
    }
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ConfigKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
