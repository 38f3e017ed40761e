// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing the core value types.
//!
//! Nothing in here performs I/O or knows about concrete sources; the types
//! are shared by the ports, adapters and services.

pub mod change;
pub mod config_key;
pub mod config_value;
pub mod errors;
pub mod init_state;
pub mod settings;

// Re-export commonly used types
pub use change::{ConfigChange, ConfigChangeEvent, PropertyChangeType};
pub use config_key::ConfigKey;
pub use config_value::ConfigValue;
pub use errors::{ConfigError, Result};
pub use init_state::InitState;
pub use settings::OverlaySettings;
