// SPDX-License-Identifier: MIT OR Apache-2.0

//! A layered configuration overlay with live updates.
//!
//! This crate merges configuration namespaces served by a remote dynamic
//! configuration service, plus any local property files it discovers, into
//! a host's ordered property stack. When the remote service reports a
//! change, consumers that were bound to the affected keys are rebound in
//! place without restarting the process.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Value types (`ConfigKey`, `ConfigValue`, change events,
//!   settings, errors)
//! - **Ports**: Trait definitions for the collaborators (`PropertySource`,
//!   `Environment`, `RemoteConfigClient`, `Rebindable`, `ConfigParser`,
//!   `ResourceLoader`)
//! - **Adapters**: Implementations of those ports (live namespace views, an
//!   in-memory remote client, filesystem loading, `.properties` and YAML parsing)
//! - **Service**: Composition, the change registry and the propagator, behind
//!   the `ConfigOverlay` facade
//!
//! # Features
//!
//! - **Ranked Namespaces**: Lower priority numbers shadow higher ones
//! - **Bootstrap Aware**: The composed layer sits directly behind a bootstrap
//!   layer when the host has one
//! - **Prefix Registration**: Consumers declare interest in key prefixes
//! - **Shadow Check**: Changes hidden by a higher-precedence layer do not
//!   trigger rebinds
//! - **Idempotent**: Composition and wiring each happen at most once
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML local files and YAML settings (default)
//!
//! # Quick Start
//!
//! ```rust
//! use overlaycfg::prelude::*;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(InMemoryConfigClient::new());
//! client.publish("app", [("timeout", "30")]);
//! client.publish("common", [("timeout", "10"), ("retries", "3")]);
//!
//! let overlay = ConfigOverlay::builder(client.clone())
//!     .with_settings(OverlaySettings::default().with_search_locations(Vec::<PathBuf>::new()))
//!     .build()?;
//! overlay.add_namespaces(["app"], 1);
//! overlay.add_namespaces(["common"], 2);
//!
//! let stack = Arc::new(PropertyStack::new());
//! overlay.compose_once(&stack);
//! assert_eq!(stack.get_property_str("timeout").unwrap(), "30");
//! assert_eq!(stack.get_property_str("retries").unwrap(), "3");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::adapters::{InMemoryConfigClient, MapSource};
    pub use crate::domain::{
        ConfigChange, ConfigChangeEvent, ConfigError, ConfigKey, ConfigValue, OverlaySettings,
        PropertyChangeType, Result,
    };
    pub use crate::ports::{
        ConfigChangeListener, Environment, PropertySource, RebindFn, Rebindable,
        RemoteConfigClient,
    };
    pub use crate::service::{
        ComposeOutcome, ConfigOverlay, PropertyStack, WireOutcome,
    };
}
