// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML configuration file parser.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use std::collections::BTreeMap;

/// Flattens YAML documents into dot-notation keys.
///
/// Sequences become numeric segments (`servers.0`), `null` becomes the empty
/// string, and non-string mapping keys are skipped.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::adapters::YamlParser;
/// use overlaycfg::ports::ConfigParser;
///
/// let parser = YamlParser::new();
/// let values = parser.parse("database:\n  host: localhost\n  port: 5432").unwrap();
/// assert_eq!(values["database.host"], "localhost");
/// assert_eq!(values["database.port"], "5432");
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    fn flatten(value: &serde_yaml::Value, prefix: &str, out: &mut BTreeMap<String, String>) {
        match value {
            serde_yaml::Value::Mapping(map) => {
                for (key, val) in map {
                    if let Some(key) = key.as_str() {
                        let path = if prefix.is_empty() {
                            key.to_string()
                        } else {
                            format!("{}.{}", prefix, key)
                        };
                        Self::flatten(val, &path, out);
                    }
                }
            }
            serde_yaml::Value::Sequence(seq) => {
                for (i, val) in seq.iter().enumerate() {
                    Self::flatten(val, &format!("{}.{}", prefix, i), out);
                }
            }
            serde_yaml::Value::String(s) => {
                out.insert(prefix.to_string(), s.clone());
            }
            serde_yaml::Value::Number(n) => {
                out.insert(prefix.to_string(), n.to_string());
            }
            serde_yaml::Value::Bool(b) => {
                out.insert(prefix.to_string(), b.to_string());
            }
            serde_yaml::Value::Null => {
                out.insert(prefix.to_string(), String::new());
            }
            serde_yaml::Value::Tagged(tagged) => Self::flatten(&tagged.value, prefix, out),
        }
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<BTreeMap<String, String>> {
        // An empty file is a valid, empty layer.
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;

        let mut out = BTreeMap::new();
        Self::flatten(&value, "", &mut out);
        Ok(out)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yml", "yaml"]
    }
}
