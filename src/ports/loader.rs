// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local resource resolution port.

use crate::domain::Result;
use std::path::Path;

/// Resolves local configuration resources for discovery.
///
/// Discovery distinguishes two kinds of failure. A location that cannot be
/// enumerated at all is reported by [`ResourceLoader::check_location`] and
/// skips only that location. A single candidate that cannot be read is
/// reported by [`ResourceLoader::read`] and skips only that candidate.
pub trait ResourceLoader: Send + Sync {
    /// Returns `Ok(true)` if `location` can be searched, `Ok(false)` if it
    /// simply does not exist, and `Err(LocalEnumerationFailure)` if it exists
    /// but cannot be accessed.
    fn check_location(&self, location: &Path) -> Result<bool>;

    /// Reads the candidate at `path`. `Ok(None)` means not found.
    fn read(&self, path: &Path) -> Result<Option<String>>;
}
