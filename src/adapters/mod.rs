// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing implementations of the ports.
//!
//! Property layers (live namespace views and fixed maps), an in-process
//! remote client, a filesystem loader and the file-format parsers used by
//! local discovery.

pub mod fs_loader;
pub mod map_source;
pub mod memory_client;
pub mod namespace_source;
pub mod properties;
#[cfg(feature = "yaml")]
pub mod yaml;

pub use fs_loader::FsResourceLoader;
pub use map_source::MapSource;
pub use memory_client::InMemoryConfigClient;
pub use namespace_source::{NamespaceSnapshot, NamespaceSource, SharedSnapshot};
pub use properties::PropertiesParser;
#[cfg(feature = "yaml")]
pub use yaml::YamlParser;
