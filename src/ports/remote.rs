// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote configuration client port.
//!
//! The transport, authentication and persistence of the remote service are
//! the client's business. The overlay only needs a live view per namespace
//! and a way to be told when a namespace changes.

use crate::domain::{ConfigChangeEvent, Result};
use crate::ports::PropertySource;
use std::sync::Arc;

/// Receives batches of changes for a namespace.
///
/// Clients deliver events for one namespace one at a time and in order, but
/// events for different namespaces may arrive concurrently, so listeners
/// must be `Send + Sync`.
pub trait ConfigChangeListener: Send + Sync {
    /// Handles one batch of changes. Must not panic on bad input; failures
    /// are logged by the listener itself.
    fn on_change(&self, event: &ConfigChangeEvent);
}

impl<F> ConfigChangeListener for F
where
    F: Fn(&ConfigChangeEvent) + Send + Sync,
{
    fn on_change(&self, event: &ConfigChangeEvent) {
        self(event)
    }
}

/// A client for the remote dynamic configuration service.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::adapters::InMemoryConfigClient;
/// use overlaycfg::ports::RemoteConfigClient;
///
/// let client = InMemoryConfigClient::new();
/// client.publish("app", [("timeout", "30")]);
///
/// let source = client.get_config("app").unwrap();
/// assert_eq!(source.get_str("timeout").unwrap().unwrap().as_str(), "30");
/// ```
pub trait RemoteConfigClient: Send + Sync {
    /// Returns a live read view of `namespace`.
    ///
    /// Repeated calls for the same namespace return views over the same
    /// backing state. Fails with `NamespaceUnavailable` when the namespace
    /// cannot be fetched.
    fn get_config(&self, namespace: &str) -> Result<Arc<dyn PropertySource>>;

    /// Registers `listener` for change batches on `namespace`.
    fn subscribe(&self, namespace: &str, listener: Arc<dyn ConfigChangeListener>) -> Result<()>;
}
