// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem resource loader for local discovery.

use crate::domain::{ConfigError, Result};
use crate::ports::ResourceLoader;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Maximum size of a local configuration file (10MB)
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Reads discovery candidates from the local filesystem.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::adapters::FsResourceLoader;
/// use overlaycfg::ports::ResourceLoader;
/// use std::path::Path;
///
/// let loader = FsResourceLoader::new();
/// assert!(!loader.check_location(Path::new("/definitely/not/here")).unwrap());
/// assert!(loader.read(Path::new("/definitely/not/here.yaml")).unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct FsResourceLoader {
    max_file_size: u64,
}

impl FsResourceLoader {
    /// Creates a loader with the default 10MB file size limit.
    pub fn new() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
        }
    }

    /// Overrides the file size limit.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    fn load_failure(path: &Path, message: impl Into<String>, err: Option<std::io::Error>) -> ConfigError {
        ConfigError::LocalLoadFailure {
            path: path.to_path_buf(),
            message: message.into(),
            source: err.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }
}

impl Default for FsResourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceLoader for FsResourceLoader {
    fn check_location(&self, location: &Path) -> Result<bool> {
        match fs::metadata(location) {
            Ok(meta) if meta.is_dir() => {
                // Listing proves the directory is actually readable.
                fs::read_dir(location).map_err(|e| ConfigError::LocalEnumerationFailure {
                    location: location.to_path_buf(),
                    source: e,
                })?;
                Ok(true)
            }
            Ok(_) => Err(ConfigError::LocalEnumerationFailure {
                location: location.to_path_buf(),
                source: std::io::Error::new(ErrorKind::Other, "not a directory"),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ConfigError::LocalEnumerationFailure {
                location: location.to_path_buf(),
                source: e,
            }),
        }
    }

    fn read(&self, path: &Path) -> Result<Option<String>> {
        let canonical = match path.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::load_failure(path, "Invalid or inaccessible path", Some(e))),
        };

        let metadata = fs::metadata(&canonical)
            .map_err(|e| Self::load_failure(path, "Failed to read file metadata", Some(e)))?;
        if !metadata.is_file() {
            return Ok(None);
        }
        if metadata.len() > self.max_file_size {
            return Err(Self::load_failure(
                path,
                format!(
                    "Configuration file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    self.max_file_size
                ),
                None,
            ));
        }

        fs::read_to_string(&canonical)
            .map(Some)
            .map_err(|e| Self::load_failure(path, "Failed to read configuration file", Some(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_check_location_existing_dir() {
        let dir = tempdir().unwrap();
        assert!(FsResourceLoader::new().check_location(dir.path()).unwrap());
    }

    #[test]
    fn test_check_location_file_is_enumeration_failure() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            FsResourceLoader::new().check_location(file.path()),
            Err(ConfigError::LocalEnumerationFailure { .. })
        ));
    }

    #[test]
    fn test_read_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a=1").unwrap();
        let content = FsResourceLoader::new().read(file.path()).unwrap();
        assert_eq!(content.as_deref(), Some("a=1"));
    }

    #[test]
    fn test_read_directory_is_not_found() {
        let dir = tempdir().unwrap();
        assert!(FsResourceLoader::new().read(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_read_rejects_large_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "0123456789").unwrap();
        let loader = FsResourceLoader::new().with_max_file_size(4);
        assert!(matches!(
            loader.read(file.path()),
            Err(ConfigError::LocalLoadFailure { .. })
        ));
    }
}
