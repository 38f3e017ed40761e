// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file parser trait definition.
//!
//! Local discovery turns each file it finds into a flat layer. A parser is
//! picked by file extension, and nested structures are flattened with dot
//! notation:
//!
//! ```yaml
//! database:
//!   host: localhost
//! ```
//!
//! becomes `database.host -> "localhost"`.

use crate::domain::Result;
use std::collections::BTreeMap;

/// Parses one configuration file format into flat key-value pairs.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::ports::ConfigParser;
/// use overlaycfg::domain::Result;
/// use std::collections::BTreeMap;
///
/// struct LineParser;
///
/// impl ConfigParser for LineParser {
///     fn parse(&self, content: &str) -> Result<BTreeMap<String, String>> {
///         Ok(content
///             .lines()
///             .filter_map(|line| line.split_once(' '))
///             .map(|(k, v)| (k.to_string(), v.to_string()))
///             .collect())
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["conf"]
///     }
/// }
///
/// assert_eq!(LineParser.parse("a 1").unwrap()["a"], "1");
/// ```
pub trait ConfigParser: Send + Sync {
    /// Parses file content into a flat key-value map.
    fn parse(&self, content: &str) -> Result<BTreeMap<String, String>>;

    /// File extensions (without the leading dot) this parser reads, in the
    /// order discovery should try them.
    fn supported_extensions(&self) -> &[&str];
}
