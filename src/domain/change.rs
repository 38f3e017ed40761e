// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change events produced by the remote configuration client.
//!
//! One [`ConfigChangeEvent`] batches every key that changed in a single
//! namespace during one polling or push cycle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The kind of change applied to a single key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyChangeType {
    /// The key did not exist before.
    Added,
    /// The key existed and its value changed.
    Modified,
    /// The key no longer exists.
    Deleted,
}

impl fmt::Display for PropertyChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PropertyChangeType::Added => "ADDED",
            PropertyChangeType::Modified => "MODIFIED",
            PropertyChangeType::Deleted => "DELETED",
        };
        f.write_str(s)
    }
}

/// A single key's change record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigChange {
    /// The namespace the change happened in
    pub namespace: String,
    /// The changed key
    pub property_name: String,
    /// The value before the change, if the key existed
    pub old_value: Option<String>,
    /// The value after the change, if the key still exists
    pub new_value: Option<String>,
    /// What kind of change this is
    pub change_type: PropertyChangeType,
}

impl ConfigChange {
    /// A key that appeared with `value`.
    pub fn added(
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            property_name: key.into(),
            old_value: None,
            new_value: Some(value.into()),
            change_type: PropertyChangeType::Added,
        }
    }

    /// A key whose value went from `old` to `new`.
    pub fn modified(
        namespace: impl Into<String>,
        key: impl Into<String>,
        old: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            property_name: key.into(),
            old_value: Some(old.into()),
            new_value: Some(new.into()),
            change_type: PropertyChangeType::Modified,
        }
    }

    /// A key that was removed; `old` is its last value.
    pub fn deleted(
        namespace: impl Into<String>,
        key: impl Into<String>,
        old: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            property_name: key.into(),
            old_value: Some(old.into()),
            new_value: None,
            change_type: PropertyChangeType::Deleted,
        }
    }
}

/// A batch of key changes for one namespace.
///
/// # Examples
///
/// ```
/// use overlaycfg::domain::{ConfigChange, ConfigChangeEvent, PropertyChangeType};
///
/// let event = ConfigChangeEvent::new(
///     "app",
///     vec![ConfigChange::modified("app", "timeout", "30", "45")],
/// );
/// assert_eq!(event.changed_keys().collect::<Vec<_>>(), vec!["timeout"]);
/// assert_eq!(
///     event.get_change("timeout").unwrap().change_type,
///     PropertyChangeType::Modified
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigChangeEvent {
    namespace: String,
    changes: BTreeMap<String, ConfigChange>,
}

impl ConfigChangeEvent {
    /// Builds an event from individual changes. A later change for the same
    /// key replaces an earlier one.
    pub fn new(namespace: impl Into<String>, changes: impl IntoIterator<Item = ConfigChange>) -> Self {
        Self {
            namespace: namespace.into(),
            changes: changes
                .into_iter()
                .map(|change| (change.property_name.clone(), change))
                .collect(),
        }
    }

    /// Computes the event that turns `old` into `new`.
    pub fn diff(
        namespace: &str,
        old: &BTreeMap<String, String>,
        new: &BTreeMap<String, String>,
    ) -> Self {
        let mut changes = Vec::new();

        for (key, new_value) in new {
            match old.get(key) {
                None => changes.push(ConfigChange::added(namespace, key, new_value)),
                Some(old_value) if old_value != new_value => {
                    changes.push(ConfigChange::modified(namespace, key, old_value, new_value))
                }
                Some(_) => {}
            }
        }
        for (key, old_value) in old {
            if !new.contains_key(key) {
                changes.push(ConfigChange::deleted(namespace, key, old_value));
            }
        }

        Self::new(namespace, changes)
    }

    /// The namespace this event belongs to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The changed keys, in sorted order.
    pub fn changed_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.changes.keys().map(String::as_str)
    }

    /// The change record for `key`, if it changed.
    pub fn get_change(&self, key: &str) -> Option<&ConfigChange> {
        self.changes.get(key)
    }

    /// Whether the event carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changed keys.
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}
