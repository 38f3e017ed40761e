// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer: composition of layers and propagation of changes.
//!
//! [`ConfigOverlay`] is the entry point. The pieces it is built from are
//! public so hosts can assemble them differently.

pub mod composition;
pub mod discovery;
pub mod overlay;
pub mod propagator;
pub mod property_stack;
pub mod registry;
pub mod source_chain;

// Re-export commonly used types
pub use composition::{ComposeOutcome, CompositionEngine, NamespaceDeclarations};
pub use discovery::LocalDiscovery;
pub use overlay::{ConfigOverlay, ConfigOverlayBuilder, WireOutcome};
pub use propagator::{ChangePropagator, PropagationReport};
pub use property_stack::PropertyStack;
pub use registry::ChangeRegistry;
pub use source_chain::SourceChain;
