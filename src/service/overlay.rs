// SPDX-License-Identifier: MIT OR Apache-2.0

//! The overlay facade handed to the host.
//!
//! A host drives the overlay in two steps, each safe to call any number of
//! times from any thread:
//!
//! 1. [`ConfigOverlay::compose_once`] while preparing its property stack,
//! 2. [`ConfigOverlay::wire_auto_update_once`] once its consumers exist.

use crate::adapters::{FsResourceLoader, PropertiesParser};
use crate::domain::{ConfigError, InitState, OverlaySettings, Result};
use crate::ports::{
    ConfigChangeListener, ConfigParser, Environment, Rebindable, RemoteConfigClient,
    ResourceLoader,
};
use crate::service::{
    ChangePropagator, ChangeRegistry, ComposeOutcome, CompositionEngine, LocalDiscovery,
    PropertyStack,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// What a call to [`ConfigOverlay::wire_auto_update_once`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireOutcome {
    /// Consumers were registered and the propagator subscribed.
    Wired {
        /// New (prefix, consumer) registrations.
        consumers: usize,
        /// Namespaces successfully subscribed to.
        subscriptions: usize,
    },
    /// Wiring already happened; nothing changed.
    AlreadyWired,
    /// Auto-update is turned off in the settings.
    Disabled,
}

/// Composes remote namespaces into a host property stack and keeps bound
/// consumers up to date as those namespaces change.
///
/// # Examples
///
/// ```rust
/// use overlaycfg::adapters::InMemoryConfigClient;
/// use overlaycfg::domain::OverlaySettings;
/// use overlaycfg::ports::{Environment, RebindFn, Rebindable};
/// use overlaycfg::service::{ConfigOverlay, PropertyStack, WireOutcome};
/// use std::path::PathBuf;
/// use std::sync::Arc;
///
/// # fn main() -> overlaycfg::domain::Result<()> {
/// let client = Arc::new(InMemoryConfigClient::new());
/// client.publish("app", [("timeout", "30")]);
///
/// let overlay = ConfigOverlay::builder(client.clone())
///     .with_settings(OverlaySettings::default().with_search_locations(Vec::<PathBuf>::new()))
///     .build()?;
/// overlay.add_namespaces(["app"], 1);
///
/// let stack = Arc::new(PropertyStack::new());
/// overlay.compose_once(&stack);
/// assert_eq!(stack.get_property_str("timeout").unwrap(), "30");
///
/// let consumer: Arc<dyn Rebindable> = Arc::new(RebindFn::new("http", |_env| Ok(())));
/// let outcome = overlay.wire_auto_update_once(stack.clone(), [("timeout", consumer)]);
/// assert_eq!(outcome, WireOutcome::Wired { consumers: 1, subscriptions: 1 });
/// # Ok(())
/// # }
/// ```
pub struct ConfigOverlay {
    settings: OverlaySettings,
    remote: Arc<dyn RemoteConfigClient>,
    engine: CompositionEngine,
    registry: Arc<ChangeRegistry>,
    propagator: OnceCell<Arc<ChangePropagator>>,
    wiring: InitState,
}

impl ConfigOverlay {
    /// Starts building an overlay over `remote`.
    pub fn builder(remote: Arc<dyn RemoteConfigClient>) -> ConfigOverlayBuilder {
        ConfigOverlayBuilder::new(remote)
    }

    /// Declares namespaces at `priority`. Lower numbers win.
    pub fn add_namespaces<I, S>(&self, names: I, priority: i32)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engine.add_namespaces(names, priority);
    }

    /// Composes the declared namespaces into `stack`. See
    /// [`CompositionEngine::compose_once`].
    pub fn compose_once(&self, stack: &PropertyStack) -> ComposeOutcome {
        self.engine.compose_once(stack)
    }

    /// Registers `consumers` by key prefix and subscribes the change
    /// propagator to every composed namespace.
    ///
    /// `environment` is what the propagator reads for the shadow check and
    /// hands to each rebind. The overlay does not remember which stack
    /// [`ConfigOverlay::compose_once`] wrote into, so pass that same stack
    /// here. Any other environment is taken as-is: a change is only applied
    /// when `environment` resolves the changed key to the new value, and
    /// consumers read from `environment`, not from the composed layer.
    ///
    /// Call this after composing, since only composed namespaces are
    /// subscribed to. Only the first call does anything, even when
    /// auto-update is disabled.
    pub fn wire_auto_update_once<I, P>(
        &self,
        environment: Arc<dyn Environment>,
        consumers: I,
    ) -> WireOutcome
    where
        I: IntoIterator<Item = (P, Arc<dyn Rebindable>)>,
        P: Into<String>,
    {
        if !self.wiring.try_begin() {
            return WireOutcome::AlreadyWired;
        }
        if !self.settings.auto_update_enabled {
            tracing::info!("Auto update of bound consumers is disabled");
            return WireOutcome::Disabled;
        }

        let mut registered = 0;
        for (prefix, consumer) in consumers {
            if self.registry.register(prefix, consumer) {
                registered += 1;
            }
        }

        let propagator = self.propagator.get_or_init(|| {
            Arc::new(ChangePropagator::new(environment, Arc::clone(&self.registry)))
        });

        let namespaces = self.engine.composed_namespaces();
        if namespaces.is_empty() {
            tracing::warn!("No composed namespaces to subscribe to; was compose_once called?");
        }

        let mut subscriptions = 0;
        for namespace in &namespaces {
            let listener: Arc<dyn ConfigChangeListener> = propagator.clone();
            match self.remote.subscribe(namespace, listener) {
                Ok(()) => subscriptions += 1,
                Err(e) => {
                    tracing::warn!("Failed to subscribe to namespace '{}': {}", namespace, e);
                }
            }
        }

        tracing::info!(
            "Auto update wired: {} consumer registration(s), {} subscription(s)",
            registered,
            subscriptions
        );
        WireOutcome::Wired {
            consumers: registered,
            subscriptions,
        }
    }

    /// The registry consumers are registered in.
    pub fn registry(&self) -> &Arc<ChangeRegistry> {
        &self.registry
    }

    /// The change propagator, once wiring has created it.
    pub fn propagator(&self) -> Option<&Arc<ChangePropagator>> {
        self.propagator.get()
    }

    /// Whether composition has run.
    pub fn is_composed(&self) -> bool {
        self.engine.is_initialized()
    }

    /// Whether wiring has run.
    pub fn is_wired(&self) -> bool {
        self.wiring.is_initialized()
    }

    /// The settings this overlay was built with.
    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    /// Namespaces in the composed chain, highest precedence first.
    pub fn composed_namespaces(&self) -> Vec<String> {
        self.engine.composed_namespaces()
    }
}

impl std::fmt::Debug for ConfigOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigOverlay")
            .field("settings", &self.settings)
            .field("engine", &self.engine)
            .field("registry", &self.registry)
            .field("wired", &self.wiring.is_initialized())
            .finish()
    }
}

/// Builder for [`ConfigOverlay`].
///
/// Without further configuration the overlay uses default settings, reads
/// local files from disk and understands `.properties` files (and YAML with
/// the `yaml` feature).
pub struct ConfigOverlayBuilder {
    remote: Arc<dyn RemoteConfigClient>,
    settings: OverlaySettings,
    loader: Option<Arc<dyn ResourceLoader>>,
    parsers: Vec<Arc<dyn ConfigParser>>,
    registry: Option<Arc<ChangeRegistry>>,
}

impl ConfigOverlayBuilder {
    /// Creates a builder over `remote`.
    pub fn new(remote: Arc<dyn RemoteConfigClient>) -> Self {
        Self {
            remote,
            settings: OverlaySettings::default(),
            loader: None,
            parsers: Vec::new(),
            registry: None,
        }
    }

    /// Replaces the settings.
    pub fn with_settings(mut self, settings: OverlaySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the resource loader used by local discovery.
    pub fn with_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Adds a local file parser. Once any parser is added, the defaults are
    /// not registered.
    pub fn with_parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Shares an existing registry instead of creating one.
    pub fn with_registry(mut self, registry: Arc<ChangeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    fn default_parsers() -> Vec<Arc<dyn ConfigParser>> {
        #[allow(unused_mut)]
        let mut parsers: Vec<Arc<dyn ConfigParser>> = vec![Arc::new(PropertiesParser::new())];
        #[cfg(feature = "yaml")]
        parsers.push(Arc::new(crate::adapters::YamlParser::new()));
        parsers
    }

    /// Builds the overlay.
    ///
    /// Fails with `InvalidSettings` if the composed layer name is empty or
    /// equal to the bootstrap layer name.
    pub fn build(self) -> Result<ConfigOverlay> {
        let settings = self.settings;
        if settings.composed_source_name.is_empty() {
            return Err(ConfigError::InvalidSettings {
                message: "composed_source_name must not be empty".to_string(),
            });
        }
        if settings.composed_source_name == settings.bootstrap_source_name {
            return Err(ConfigError::InvalidSettings {
                message: format!(
                    "composed and bootstrap layers share the name '{}'",
                    settings.composed_source_name
                ),
            });
        }

        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(FsResourceLoader::new()));
        let parsers = if self.parsers.is_empty() {
            Self::default_parsers()
        } else {
            self.parsers
        };
        let discovery = parsers.into_iter().fold(
            LocalDiscovery::new(
                settings.effective_search_locations(),
                settings.file_names.clone(),
                loader,
            ),
            LocalDiscovery::with_parser,
        );

        let engine = CompositionEngine::new(Arc::clone(&self.remote), discovery, &settings);
        Ok(ConfigOverlay {
            settings,
            remote: self.remote,
            engine,
            registry: self.registry.unwrap_or_default(),
            propagator: OnceCell::new(),
            wiring: InitState::new(),
        })
    }
}
