// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot composition of remote namespaces into the property stack.

use crate::domain::{InitState, OverlaySettings};
use crate::ports::{Environment, PropertySource, RemoteConfigClient};
use crate::service::{LocalDiscovery, PropertyStack, SourceChain};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Namespaces the host asked for, grouped by priority.
///
/// Groups are visited in ascending priority order and names within a group
/// in declaration order. Declaring the same name twice at the same priority
/// has no effect.
#[derive(Debug, Default)]
pub struct NamespaceDeclarations {
    groups: RwLock<BTreeMap<i32, Vec<String>>>,
}

impl NamespaceDeclarations {
    /// Creates an empty declaration set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `names` at `priority`.
    pub fn add<I, S>(&self, names: I, priority: i32)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        let group = groups.entry(priority).or_default();
        for name in names {
            let name = name.into();
            if !group.contains(&name) {
                group.push(name);
            }
        }
    }

    /// Whether nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .all(Vec::is_empty)
    }

    /// Every `(priority, namespace)` pair in composition order.
    pub fn ordered(&self) -> Vec<(i32, String)> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .flat_map(|(priority, names)| names.iter().map(move |n| (*priority, n.clone())))
            .collect()
    }

    /// Splits a comma-separated declaration, trimming entries and dropping
    /// empty ones.
    ///
    /// ```rust
    /// use overlaycfg::service::NamespaceDeclarations;
    ///
    /// assert_eq!(
    ///     NamespaceDeclarations::parse_list(" app, ,common "),
    ///     vec!["app", "common"]
    /// );
    /// ```
    pub fn parse_list(declaration: &str) -> Vec<String> {
        declaration
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// What a call to [`CompositionEngine::compose_once`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeOutcome {
    /// The chain was built and inserted.
    Composed {
        /// Namespaces in the chain, highest precedence first.
        layers: Vec<String>,
        /// Local layers added by discovery, in discovery order.
        local_layers: Vec<String>,
    },
    /// A composed chain already exists; nothing changed.
    AlreadyComposed,
    /// No namespace was declared; nothing changed.
    NothingDeclared,
}

/// Builds the composed [`SourceChain`] from the declared namespaces and
/// places it in the host's [`PropertyStack`].
///
/// Composition happens at most once. Concurrent first calls race on a
/// compare-and-swap and only the winner does any work; there is no lock held
/// while namespaces are fetched.
pub struct CompositionEngine {
    remote: Arc<dyn RemoteConfigClient>,
    discovery: LocalDiscovery,
    declarations: NamespaceDeclarations,
    state: InitState,
    composed: RwLock<Vec<String>>,
    local_layers: RwLock<Vec<String>>,
    namespace_property: String,
    composed_source_name: String,
    bootstrap_source_name: String,
}

impl CompositionEngine {
    /// Creates an engine with nothing declared.
    pub fn new(
        remote: Arc<dyn RemoteConfigClient>,
        discovery: LocalDiscovery,
        settings: &OverlaySettings,
    ) -> Self {
        Self {
            remote,
            discovery,
            declarations: NamespaceDeclarations::new(),
            state: InitState::new(),
            composed: RwLock::new(Vec::new()),
            local_layers: RwLock::new(Vec::new()),
            namespace_property: settings.namespace_property.clone(),
            composed_source_name: settings.composed_source_name.clone(),
            bootstrap_source_name: settings.bootstrap_source_name.clone(),
        }
    }

    /// Declares namespaces at `priority`. Lower numbers win.
    pub fn add_namespaces<I, S>(&self, names: I, priority: i32)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declarations.add(names, priority);
    }

    /// The current declarations.
    pub fn declarations(&self) -> &NamespaceDeclarations {
        &self.declarations
    }

    /// Composes the declared namespaces into `stack`.
    ///
    /// If nothing was declared, the namespace property is read from `stack`
    /// and its entries declared at priority 1. A namespace the remote client
    /// cannot provide is skipped with a warning. The chain goes directly
    /// behind the bootstrap layer if one is present, otherwise last.
    pub fn compose_once(&self, stack: &PropertyStack) -> ComposeOutcome {
        if self.declarations.is_empty() {
            if let Some(value) = stack.get_property_str(&self.namespace_property) {
                let names = NamespaceDeclarations::parse_list(value.as_str());
                tracing::debug!(
                    "Declaring namespaces {:?} from '{}'",
                    names,
                    self.namespace_property
                );
                self.declarations.add(names, 1);
            }
        }
        if self.declarations.is_empty() {
            tracing::debug!("No namespaces declared; skipping composition");
            return ComposeOutcome::NothingDeclared;
        }

        if !self.state.try_begin() {
            return ComposeOutcome::AlreadyComposed;
        }

        let local_layers = self.discovery.discover_into(stack);
        *self
            .local_layers
            .write()
            .unwrap_or_else(PoisonError::into_inner) = local_layers.clone();

        if stack.contains(&self.composed_source_name) {
            tracing::debug!(
                "Property source '{}' already present",
                self.composed_source_name
            );
            return ComposeOutcome::AlreadyComposed;
        }

        let declared = self.declarations.ordered();
        tracing::info!(
            "Composing {} namespace(s) into '{}'",
            declared.len(),
            self.composed_source_name
        );

        let mut chain = SourceChain::new(self.composed_source_name.clone());
        for (priority, namespace) in declared {
            match self.remote.get_config(&namespace) {
                Ok(source) => {
                    chain.add_layer(priority, source);
                }
                Err(e) => {
                    tracing::warn!("Skipping namespace '{}': {}", namespace, e);
                }
            }
        }

        let layers: Vec<String> = chain.layer_names().into_iter().map(String::from).collect();
        *self.composed.write().unwrap_or_else(PoisonError::into_inner) = layers.clone();

        let chain: Arc<dyn PropertySource> = Arc::new(chain);
        if stack.contains(&self.bootstrap_source_name) {
            // Presence was just checked; a concurrent removal falls back to last.
            if let Err(e) = stack.add_after(&self.bootstrap_source_name, Arc::clone(&chain)) {
                tracing::debug!("Bootstrap layer vanished ({}); appending instead", e);
                stack.add_last(chain);
            }
        } else {
            stack.add_last(chain);
        }

        tracing::info!(
            "Composed '{}' with layers {:?}",
            self.composed_source_name,
            layers
        );
        ComposeOutcome::Composed {
            layers,
            local_layers,
        }
    }

    /// Namespaces that made it into the composed chain, highest precedence first.
    pub fn composed_namespaces(&self) -> Vec<String> {
        self.composed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether composition has run.
    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    /// Removes the composed chain and discovered local layers from `stack`
    /// and allows composition to run again.
    pub fn reset(&self, stack: &PropertyStack) {
        stack.remove(&self.composed_source_name);
        let mut local_layers = self
            .local_layers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for name in local_layers.drain(..) {
            stack.remove(&name);
        }
        self.composed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.state.reset();
    }
}

impl std::fmt::Debug for CompositionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionEngine")
            .field("composed_source_name", &self.composed_source_name)
            .field("bootstrap_source_name", &self.bootstrap_source_name)
            .field("declarations", &self.declarations)
            .field("initialized", &self.state.is_initialized())
            .finish()
    }
}
