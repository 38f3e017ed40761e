// SPDX-License-Identifier: MIT OR Apache-2.0

//! The composed environment seen by the application.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, Result};

/// Read access to the fully layered configuration.
///
/// This is what the application (and the shadow check in change
/// propagation) sees: the value from the highest-precedence layer that
/// defines a key, across every layer the host has installed.
pub trait Environment: Send + Sync {
    /// Returns the currently visible value for `key`, if any layer defines it.
    fn get_property(&self, key: &ConfigKey) -> Option<ConfigValue>;

    /// Returns the visible value for a string key.
    fn get_property_str(&self, key: &str) -> Option<ConfigValue> {
        self.get_property(&ConfigKey::from(key))
    }

    /// Returns the visible value or a `ConfigKeyNotFound` error.
    fn require(&self, key: &str) -> Result<ConfigValue> {
        self.get_property_str(key)
            .ok_or_else(|| ConfigError::ConfigKeyNotFound {
                key: key.to_string(),
            })
    }

    /// Returns the visible value or `default`.
    fn get_or_default(&self, key: &str, default: &str) -> ConfigValue {
        self.get_property_str(key)
            .unwrap_or_else(|| ConfigValue::from(default))
    }
}
