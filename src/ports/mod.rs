// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! These traits are the seams between the overlay core and its
//! collaborators: property layers, the composed environment, the remote
//! client, rebind targets, file parsers and local resource resolution.

pub mod environment;
pub mod loader;
pub mod parser;
pub mod rebind;
pub mod remote;
pub mod source;

// Re-export commonly used types
pub use environment::Environment;
pub use loader::ResourceLoader;
pub use parser::ConfigParser;
pub use rebind::{RebindFn, Rebindable};
pub use remote::{ConfigChangeListener, RemoteConfigClient};
pub use source::PropertySource;
