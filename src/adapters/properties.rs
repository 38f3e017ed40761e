// SPDX-License-Identifier: MIT OR Apache-2.0

//! `.properties` file parser.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use std::collections::BTreeMap;

/// Parses line-oriented `key=value` files the way `java.util.Properties`
/// reads them.
///
/// Supported syntax:
/// - `#` and `!` start comment lines; blank lines are ignored
/// - the key ends at the first unescaped `=`, `:` or whitespace; whitespace
///   and one optional `=` or `:` after it are skipped
/// - a line ending in an odd number of `\` continues on the next line, whose
///   leading whitespace is dropped
/// - `\t`, `\n`, `\r`, `\f` and `\uXXXX` are decoded, any other escaped
///   character stands for itself (so `\=`, `\:` and `\ ` can appear in keys)
/// - a later definition of the same key wins
///
/// A malformed `\uXXXX` escape is the only parse error.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::adapters::PropertiesParser;
/// use overlaycfg::ports::ConfigParser;
///
/// let values = PropertiesParser::new()
///     .parse("# pool\ndb.pool.size = 8\ndb.url: jdbc:x\ntimeout 30")
///     .unwrap();
/// assert_eq!(values["db.pool.size"], "8");
/// assert_eq!(values["db.url"], "jdbc:x");
/// assert_eq!(values["timeout"], "30");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertiesParser;

impl PropertiesParser {
    /// Creates a new properties parser.
    pub fn new() -> Self {
        PropertiesParser
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0C')
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Splits a logical line at the first unescaped separator.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut end = line.len();
    for (pos, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            end = pos;
            break;
        }
    }

    let rest = line[end..].trim_start_matches(is_blank);
    let rest = rest
        .strip_prefix(['=', ':'])
        .unwrap_or(rest)
        .trim_start_matches(is_blank);
    (&line[..end], rest)
}

fn unescape(raw: &str, line: usize) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_units(&mut units, &mut out);
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            break;
        };
        if escaped == 'u' {
            let hex: String = chars.by_ref().take(4).collect();
            let unit = Some(hex.as_str())
                .filter(|h| h.len() == 4 && h.chars().all(|c| c.is_ascii_hexdigit()))
                .and_then(|h| u16::from_str_radix(h, 16).ok())
                .ok_or_else(|| ConfigError::ParseError {
                    message: format!("Malformed \\uXXXX escape on line {}", line),
                    source: None,
                })?;
            units.push(unit);
            continue;
        }
        flush_units(&mut units, &mut out);
        out.push(match escaped {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0C',
            other => other,
        });
    }
    flush_units(&mut units, &mut out);
    Ok(out)
}

// Surrogate pairs arrive as two consecutive escapes.
fn flush_units(units: &mut Vec<u16>, out: &mut String) {
    out.extend(
        char::decode_utf16(units.drain(..)).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

impl ConfigParser for PropertiesParser {
    fn parse(&self, content: &str) -> Result<BTreeMap<String, String>> {
        let mut out = BTreeMap::new();
        let mut lines = content.lines().enumerate();

        while let Some((index, raw)) = lines.next() {
            let line = raw.trim_start_matches(is_blank);
            if line.is_empty() || line.starts_with(['#', '!']) {
                continue;
            }

            let mut logical = line.to_string();
            while continues(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            let key = unescape(key, index + 1)?;
            let value = unescape(value, index + 1)?;
            out.insert(key, value);
        }

        Ok(out)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties"]
    }
}
