// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning remote change batches into consumer rebinds.

use crate::domain::{ConfigChange, ConfigChangeEvent, ConfigKey, PropertyChangeType};
use crate::ports::{ConfigChangeListener, Environment};
use crate::service::ChangeRegistry;
use std::sync::Arc;

/// Counts from one [`ChangePropagator::propagate`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Changed keys no consumer is registered for.
    pub unbound_keys: usize,
    /// Changed keys whose new value is hidden by a higher-precedence layer.
    pub shadowed_keys: usize,
    /// Successful rebinds.
    pub rebinds: usize,
    /// Failed rebinds.
    pub failures: usize,
}

/// Reacts to change batches from the remote client by rebinding the
/// consumers registered for each changed key.
///
/// A change only triggers rebinds if it is visible through the composed
/// environment: deletions always are, while additions and modifications
/// count only when the environment now resolves the key to the new value.
/// A layer whose value is shadowed by a higher-precedence layer therefore
/// causes no rebind.
///
/// The check compares values only, so a change that leaves the composed
/// value equal to the new value by coincidence still rebinds, and a change
/// shadowed by an equal value is indistinguishable from an unshadowed one.
pub struct ChangePropagator {
    environment: Arc<dyn Environment>,
    registry: Arc<ChangeRegistry>,
}

impl ChangePropagator {
    /// Creates a propagator reading through `environment`.
    pub fn new(environment: Arc<dyn Environment>, registry: Arc<ChangeRegistry>) -> Self {
        Self {
            environment,
            registry,
        }
    }

    /// The registry consulted for each changed key.
    pub fn registry(&self) -> &Arc<ChangeRegistry> {
        &self.registry
    }

    /// Whether `change` is visible through the composed environment.
    pub fn should_trigger_auto_update(&self, change: &ConfigChange) -> bool {
        if change.change_type == PropertyChangeType::Deleted {
            return true;
        }
        let current = self
            .environment
            .get_property(&ConfigKey::from(change.property_name.as_str()));
        match (current, change.new_value.as_deref()) {
            (Some(current), Some(new_value)) => current == new_value,
            (None, None) => true,
            _ => false,
        }
    }

    /// Processes every changed key in `event` independently.
    ///
    /// A failing consumer is logged and does not stop the remaining
    /// consumers or keys.
    pub fn propagate(&self, event: &ConfigChangeEvent) -> PropagationReport {
        let mut report = PropagationReport::default();
        if event.is_empty() {
            return report;
        }

        for key in event.changed_keys() {
            let targets = self.registry.lookup(&ConfigKey::from(key));
            if targets.is_empty() {
                report.unbound_keys += 1;
                continue;
            }

            let Some(change) = event.get_change(key) else {
                continue;
            };
            if !self.should_trigger_auto_update(change) {
                tracing::debug!(
                    "Change to '{}' in namespace '{}' is shadowed; not rebinding",
                    key,
                    event.namespace()
                );
                report.shadowed_keys += 1;
                continue;
            }

            for target in targets {
                match target.rebind(self.environment.as_ref()) {
                    Ok(()) => {
                        tracing::debug!(
                            "Rebound '{}' after {} of '{}'",
                            target.name(),
                            change.change_type,
                            key
                        );
                        report.rebinds += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            "Auto update failed for '{}' on key '{}': {}",
                            target.name(),
                            key,
                            e
                        );
                        report.failures += 1;
                    }
                }
            }
        }

        report
    }
}

impl ConfigChangeListener for ChangePropagator {
    fn on_change(&self, event: &ConfigChangeEvent) {
        let report = self.propagate(event);
        tracing::debug!(
            "Processed {} change(s) in namespace '{}': {:?}",
            event.len(),
            event.namespace(),
            report
        );
    }
}

impl std::fmt::Debug for ChangePropagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePropagator")
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MapSource;
    use crate::domain::{ConfigError, Result};
    use crate::ports::{RebindFn, Rebindable};
    use crate::service::PropertyStack;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(name: &str, counter: Arc<AtomicUsize>) -> Arc<dyn Rebindable> {
        Arc::new(RebindFn::new(name, move |_env: &dyn Environment| -> Result<()> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
    }

    fn propagator(pairs: &[(&str, &str)]) -> ChangePropagator {
        let stack = PropertyStack::new();
        stack.add_last(Arc::new(MapSource::from_pairs("env", pairs.iter().copied())));
        ChangePropagator::new(Arc::new(stack), Arc::new(ChangeRegistry::new()))
    }

    #[test]
    fn test_shadowed_modification_does_not_rebind() {
        let propagator = propagator(&[("timeout", "5")]);
        let count = Arc::new(AtomicUsize::new(0));
        propagator.registry().register("timeout", counting("c", count.clone()));

        let event = ConfigChangeEvent::new(
            "common",
            [ConfigChange::modified("common", "timeout", "10", "20")],
        );
        let report = propagator.propagate(&event);
        assert_eq!(report.shadowed_keys, 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_visible_modification_rebinds_once() {
        let propagator = propagator(&[("timeout", "20")]);
        let count = Arc::new(AtomicUsize::new(0));
        propagator.registry().register("time", counting("c", count.clone()));

        let event = ConfigChangeEvent::new(
            "app",
            [ConfigChange::modified("app", "timeout", "10", "20")],
        );
        assert_eq!(propagator.propagate(&event).rebinds, 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deletion_always_rebinds() {
        let propagator = propagator(&[("timeout", "10")]);
        let count = Arc::new(AtomicUsize::new(0));
        propagator.registry().register("timeout", counting("c", count.clone()));

        let event = ConfigChangeEvent::new("app", [ConfigChange::deleted("app", "timeout", "30")]);
        propagator.propagate(&event);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unbound_key_is_skipped() {
        let propagator = propagator(&[("other", "1")]);
        let event = ConfigChangeEvent::new("app", [ConfigChange::added("app", "other", "1")]);
        let report = propagator.propagate(&event);
        assert_eq!(report.unbound_keys, 1);
        assert_eq!(report.rebinds, 0);
    }

    #[test]
    fn test_failure_is_isolated() {
        let propagator = propagator(&[("a", "1"), ("b", "2")]);
        let count = Arc::new(AtomicUsize::new(0));
        propagator.registry().register(
            "a",
            Arc::new(RebindFn::new("broken", |_env: &dyn Environment| -> Result<()> {
                Err(ConfigError::RebindFailure {
                    consumer: "broken".to_string(),
                    message: "boom".to_string(),
                    source: None,
                })
            })),
        );
        propagator.registry().register("b", counting("ok", count.clone()));

        let event = ConfigChangeEvent::new(
            "app",
            [
                ConfigChange::added("app", "a", "1"),
                ConfigChange::added("app", "b", "2"),
            ],
        );
        let report = propagator.propagate(&event);
        assert_eq!(report.failures, 1);
        assert_eq!(report.rebinds, 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_event() {
        let propagator = propagator(&[]);
        let event = ConfigChangeEvent::new("app", Vec::new());
        assert_eq!(propagator.propagate(&event), PropagationReport::default());
    }
}
