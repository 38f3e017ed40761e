// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tunables for composition, local discovery and auto-update.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default name of the property holding the namespace declaration.
pub const DEFAULT_NAMESPACE_PROPERTY: &str = "app.namespace";

/// Default name of the composed remote layer in the property stack.
pub const DEFAULT_COMPOSED_SOURCE_NAME: &str = "RemoteNamespaceSources";

/// Default name of the eager bootstrap layer the composed layer is placed after.
pub const DEFAULT_BOOTSTRAP_SOURCE_NAME: &str = "RemoteBootstrapSources";

/// Settings for a [`ConfigOverlay`](crate::service::ConfigOverlay).
///
/// Every field has a default, so a partial YAML document is enough:
///
/// ```
/// # #[cfg(feature = "yaml")]
/// # {
/// use overlaycfg::domain::OverlaySettings;
///
/// let settings = OverlaySettings::from_yaml_str("auto_update_enabled: false").unwrap();
/// assert!(!settings.auto_update_enabled);
/// assert_eq!(settings.namespace_property, "app.namespace");
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Property read for a comma-separated namespace list when none were declared
    pub namespace_property: String,
    /// Name given to the composed remote layer
    pub composed_source_name: String,
    /// Name of the bootstrap layer the composed layer goes after, if present
    pub bootstrap_source_name: String,
    /// Directories searched for local configuration files, in order
    pub search_locations: Vec<PathBuf>,
    /// Base file names tried in every search location, in order
    pub file_names: Vec<String>,
    /// Application name for the per-user config directory
    pub app_name: Option<String>,
    /// Organization qualifier for the per-user config directory
    pub qualifier: Option<String>,
    /// Whether remote changes are pushed into bound consumers
    pub auto_update_enabled: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            namespace_property: DEFAULT_NAMESPACE_PROPERTY.to_string(),
            composed_source_name: DEFAULT_COMPOSED_SOURCE_NAME.to_string(),
            bootstrap_source_name: DEFAULT_BOOTSTRAP_SOURCE_NAME.to_string(),
            search_locations: vec![PathBuf::from("./"), PathBuf::from("./config/")],
            file_names: vec![
                "application".to_string(),
                "bootstrap".to_string(),
                "business".to_string(),
            ],
            app_name: None,
            qualifier: None,
            auto_update_enabled: true,
        }
    }
}

impl OverlaySettings {
    /// Parses settings from a YAML document.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(content: &str) -> crate::domain::Result<Self> {
        serde_yaml::from_str(content).map_err(|e| crate::domain::ConfigError::ParseError {
            message: format!("Invalid overlay settings: {}", e),
            source: Some(Box::new(e)),
        })
    }

    /// Sets the property holding the namespace declaration.
    pub fn with_namespace_property(mut self, property: impl Into<String>) -> Self {
        self.namespace_property = property.into();
        self
    }

    /// Replaces the local search locations.
    pub fn with_search_locations<I, P>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the local file base names.
    pub fn with_file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Adds the per-user configuration directory for this application.
    pub fn with_project(mut self, app_name: impl Into<String>, qualifier: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Turns auto-update on or off.
    pub fn with_auto_update(mut self, enabled: bool) -> Self {
        self.auto_update_enabled = enabled;
        self
    }

    /// Returns the search locations with the per-user config directory first,
    /// when `app_name` and `qualifier` are both set and resolvable.
    pub fn effective_search_locations(&self) -> Vec<PathBuf> {
        let mut locations = Vec::with_capacity(self.search_locations.len() + 1);
        if let (Some(app), Some(qualifier)) = (&self.app_name, &self.qualifier) {
            match directories::ProjectDirs::from(qualifier, "", app) {
                Some(dirs) => locations.push(dirs.config_dir().to_path_buf()),
                None => tracing::debug!("No home directory; skipping per-user config dir for '{}'", app),
            }
        }
        locations.extend(self.search_locations.iter().cloned());
        locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = OverlaySettings::default();
        assert_eq!(settings.namespace_property, DEFAULT_NAMESPACE_PROPERTY);
        assert_eq!(settings.file_names, vec!["application", "bootstrap", "business"]);
        assert_eq!(settings.search_locations.len(), 2);
        assert!(settings.auto_update_enabled);
    }

    #[test]
    fn test_effective_locations_without_project() {
        let settings = OverlaySettings::default().with_search_locations(["/tmp/a"]);
        assert_eq!(settings.effective_search_locations(), vec![PathBuf::from("/tmp/a")]);
    }

    #[test]
    fn test_builder_methods() {
        let settings = OverlaySettings::default()
            .with_namespace_property("service.namespaces")
            .with_file_names(["app"])
            .with_auto_update(false);
        assert_eq!(settings.namespace_property, "service.namespaces");
        assert_eq!(settings.file_names, vec!["app"]);
        assert!(!settings.auto_update_enabled);
    }

    #[test]
    #[cfg(feature = "yaml")]
    fn test_from_yaml_partial() {
        let yaml = r#"
composed_source_name: Remote
search_locations:
  - /etc/myapp
"#;
        let settings = OverlaySettings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.composed_source_name, "Remote");
        assert_eq!(settings.search_locations, vec![PathBuf::from("/etc/myapp")]);
        assert_eq!(settings.bootstrap_source_name, DEFAULT_BOOTSTRAP_SOURCE_NAME);
    }

    #[test]
    #[cfg(feature = "yaml")]
    fn test_from_yaml_invalid() {
        let result = OverlaySettings::from_yaml_str("auto_update_enabled: [1, 2]");
        assert!(result.is_err());
    }
}
