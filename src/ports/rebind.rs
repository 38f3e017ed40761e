// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rebind port: re-applying configuration to a bound consumer.

use crate::domain::Result;
use crate::ports::Environment;
use std::fmt;

/// A consumer whose configuration-bound state can be refreshed in place.
///
/// How a consumer finds and assigns its values is up to the host. The
/// overlay only decides *when* to call [`Rebindable::rebind`].
///
/// # Examples
///
/// ```rust
/// use overlaycfg::domain::{ConfigValue, Result};
/// use overlaycfg::ports::{Environment, Rebindable};
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// struct HttpSettings {
///     timeout_secs: AtomicU64,
/// }
///
/// impl Rebindable for HttpSettings {
///     fn name(&self) -> &str {
///         "http"
///     }
///
///     fn rebind(&self, env: &dyn Environment) -> Result<()> {
///         let timeout: u64 = env.require("http.timeout")?.parse("http.timeout")?;
///         self.timeout_secs.store(timeout, Ordering::SeqCst);
///         Ok(())
///     }
/// }
/// ```
pub trait Rebindable: Send + Sync {
    /// A short label used in logs.
    fn name(&self) -> &str;

    /// Re-resolves every value bound to this consumer from `env` and applies it.
    fn rebind(&self, env: &dyn Environment) -> Result<()>;
}

/// Adapts a closure into a [`Rebindable`].
///
/// ```rust
/// use overlaycfg::ports::{RebindFn, Rebindable};
///
/// let consumer = RebindFn::new("noop", |_env| Ok(()));
/// assert_eq!(consumer.name(), "noop");
/// ```
pub struct RebindFn<F> {
    name: String,
    rebind: F,
}

impl<F> RebindFn<F>
where
    F: Fn(&dyn Environment) -> Result<()> + Send + Sync,
{
    /// Wraps `rebind` under the given name.
    pub fn new(name: impl Into<String>, rebind: F) -> Self {
        Self {
            name: name.into(),
            rebind,
        }
    }
}

impl<F> Rebindable for RebindFn<F>
where
    F: Fn(&dyn Environment) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn rebind(&self, env: &dyn Environment) -> Result<()> {
        (self.rebind)(env)
    }
}

impl<F> fmt::Debug for RebindFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RebindFn").field("name", &self.name).finish()
    }
}
