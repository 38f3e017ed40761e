// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery of local configuration files.

use crate::adapters::MapSource;
use crate::ports::{ConfigParser, PropertySource, ResourceLoader};
use crate::service::PropertyStack;
use std::path::PathBuf;
use std::sync::Arc;

/// Scans a fixed set of location × file name × extension candidates and
/// pushes every file it can load to the front of a [`PropertyStack`].
///
/// Candidates are visited location by location, then file name, then
/// extension (in parser registration order). Because each hit is inserted
/// first, the last file found ends up with the highest precedence.
///
/// Nothing here fails the caller: a missing or malformed candidate is
/// skipped, and a location that cannot be enumerated is logged and skipped.
pub struct LocalDiscovery {
    locations: Vec<PathBuf>,
    file_names: Vec<String>,
    loader: Arc<dyn ResourceLoader>,
    parsers: Vec<Arc<dyn ConfigParser>>,
}

impl LocalDiscovery {
    /// Creates a discovery pass with no parsers registered.
    pub fn new(
        locations: Vec<PathBuf>,
        file_names: Vec<String>,
        loader: Arc<dyn ResourceLoader>,
    ) -> Self {
        Self {
            locations,
            file_names,
            loader,
            parsers: Vec::new(),
        }
    }

    /// Registers a parser; its extensions are tried after those already registered.
    pub fn with_parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Every candidate path with the parser that reads it, in visit order,
    /// for the given location.
    fn candidates<'a>(
        &'a self,
        location: &'a std::path::Path,
    ) -> impl Iterator<Item = (PathBuf, &'a Arc<dyn ConfigParser>)> + 'a {
        self.file_names.iter().flat_map(move |file_name| {
            self.parsers.iter().flat_map(move |parser| {
                parser
                    .supported_extensions()
                    .iter()
                    .map(move |ext| (location.join(format!("{}.{}", file_name, ext)), parser))
            })
        })
    }

    /// Runs discovery and returns the names of the layers added, in the
    /// order they were found.
    pub fn discover_into(&self, stack: &PropertyStack) -> Vec<String> {
        let mut added = Vec::new();

        for location in &self.locations {
            match self.loader.check_location(location) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!("Skipping missing config location {}", location.display());
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Local configuration location skipped: {}", e);
                    continue;
                }
            }

            for (path, parser) in self.candidates(location) {
                let content = match self.loader.read(&path) {
                    Ok(Some(content)) => content,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::debug!("Skipping local candidate: {}", e);
                        continue;
                    }
                };
                let values = match parser.parse(&content) {
                    Ok(values) => values,
                    Err(e) => {
                        tracing::debug!("Skipping malformed {}: {}", path.display(), e);
                        continue;
                    }
                };

                let source = MapSource::new(format!("local:{}", path.display()), values);
                tracing::debug!(
                    "Loaded {} key(s) from {}",
                    source.len(),
                    path.display()
                );
                added.push(source.name().to_string());
                stack.add_first(Arc::new(source));
            }
        }

        added
    }
}

impl std::fmt::Debug for LocalDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalDiscovery")
            .field("locations", &self.locations)
            .field("file_names", &self.file_names)
            .field("parsers", &self.parsers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::PropertiesParser;
    use crate::domain::{ConfigError, Result};
    use crate::ports::Environment;
    use std::collections::HashMap;
    use std::path::Path;

    /// Loader over a fixed map of files; locations under `/denied` fail.
    struct FakeLoader {
        files: HashMap<PathBuf, String>,
    }

    impl ResourceLoader for FakeLoader {
        fn check_location(&self, location: &Path) -> Result<bool> {
            if location.starts_with("/denied") {
                return Err(ConfigError::LocalEnumerationFailure {
                    location: location.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            Ok(self.files.keys().any(|p| p.starts_with(location)))
        }

        fn read(&self, path: &Path) -> Result<Option<String>> {
            Ok(self.files.get(path).cloned())
        }
    }

    fn discovery(locations: &[&str], files: &[(&str, &str)]) -> LocalDiscovery {
        let loader = FakeLoader {
            files: files
                .iter()
                .map(|(p, c)| (PathBuf::from(p), c.to_string()))
                .collect(),
        };
        LocalDiscovery::new(
            locations.iter().map(PathBuf::from).collect(),
            vec!["application".to_string(), "bootstrap".to_string()],
            Arc::new(loader),
        )
        .with_parser(Arc::new(PropertiesParser::new()))
    }

    #[test]
    fn test_last_found_has_highest_precedence() {
        let discovery = discovery(
            &["/a", "/b"],
            &[
                ("/a/application.properties", "k=a-app\nonly=a"),
                ("/b/application.properties", "k=b-app"),
            ],
        );
        let stack = PropertyStack::new();
        let added = discovery.discover_into(&stack);

        assert_eq!(
            added,
            vec!["local:/a/application.properties", "local:/b/application.properties"]
        );
        assert_eq!(stack.names()[0], "local:/b/application.properties");
        assert_eq!(stack.get_property_str("k").unwrap(), "b-app");
        assert_eq!(stack.get_property_str("only").unwrap(), "a");
    }

    #[test]
    fn test_enumeration_failure_does_not_stop_other_locations() {
        let discovery = discovery(
            &["/denied", "/ok"],
            &[("/ok/bootstrap.properties", "k=ok")],
        );
        let stack = PropertyStack::new();
        let added = discovery.discover_into(&stack);
        assert_eq!(added.len(), 1);
        assert_eq!(stack.get_property_str("k").unwrap(), "ok");
    }

    #[test]
    fn test_malformed_candidate_is_skipped() {
        let discovery = discovery(
            &["/a"],
            &[
                ("/a/application.properties", "k=\\uZZZZ"),
                ("/a/bootstrap.properties", "k=fine"),
            ],
        );
        let stack = PropertyStack::new();
        let added = discovery.discover_into(&stack);
        assert_eq!(added, vec!["local:/a/bootstrap.properties"]);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_no_parsers_means_no_candidates() {
        let loader = FakeLoader {
            files: HashMap::from([(PathBuf::from("/a/application.properties"), "k=v".to_string())]),
        };
        let discovery = LocalDiscovery::new(
            vec![PathBuf::from("/a")],
            vec!["application".to_string()],
            Arc::new(loader),
        );
        let stack = PropertyStack::new();
        assert!(discovery.discover_into(&stack).is_empty());
    }
}
