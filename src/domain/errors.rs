// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the overlay crate.
//!
//! Every fallible operation below the composition and propagation boundaries
//! returns a [`ConfigError`]. The boundaries themselves (`compose_once`,
//! `wire_auto_update_once` and change delivery) log these errors and keep
//! going instead of returning them.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for overlay operations.
///
/// # Examples
///
/// ```
/// use overlaycfg::domain::ConfigError;
///
/// let error = ConfigError::NamespaceUnavailable {
///     namespace: "application".to_string(),
///     message: "connection refused".to_string(),
///     source: None,
/// };
/// assert!(error.to_string().contains("application"));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The requested configuration key was not found in any layer.
    #[error("Configuration key not found: {key}")]
    ConfigKeyNotFound {
        /// The key that was not found
        key: String,
    },

    /// Failed to convert a configuration value to the requested type.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversionError {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A property layer failed while serving a lookup.
    #[error("Property source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the layer that failed
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote client could not provide a namespace.
    #[error("Namespace '{namespace}' is unavailable: {message}")]
    NamespaceUnavailable {
        /// The namespace that could not be fetched
        namespace: String,
        /// The error message
        message: String,
        /// The underlying client error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A local configuration candidate could not be loaded.
    #[error("Failed to load local configuration '{}': {message}", path.display())]
    LocalLoadFailure {
        /// The candidate file
        path: PathBuf,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A local search location could not be enumerated.
    #[error("Failed to access configuration location '{}': {source}", location.display())]
    LocalEnumerationFailure {
        /// The search location
        location: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// A bound consumer failed to rebind.
    #[error("Failed to rebind consumer '{consumer}': {message}")]
    RebindFailure {
        /// The consumer that failed
        consumer: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to parse configuration content.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A named property layer was expected in the stack but is absent.
    #[error("Property source not found: {name}")]
    SourceNotFound {
        /// The missing layer name
        name: String,
    },

    /// Overlay settings are inconsistent.
    #[error("Invalid overlay settings: {message}")]
    InvalidSettings {
        /// What is wrong with the settings
        message: String,
    },
}

impl ConfigError {
    /// Creates a `SourceError` for a lock that was poisoned by a panicking writer.
    pub fn poisoned(source_name: impl Into<String>) -> Self {
        ConfigError::SourceError {
            source_name: source_name.into(),
            message: "lock poisoned".to_string(),
            source: None,
        }
    }

    /// Creates a `RebindFailure` from any error raised by a consumer.
    pub fn rebind<E>(consumer: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::RebindFailure {
            consumer: consumer.into(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// A specialized Result type for overlay operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
