//! Runtime core configuration.
//!
//! Loaded from TOML; every field has a default, so an empty document (or no
//! file at all) yields [`CoreConfig::default`].
//!
//! ```toml
//! [registry]
//! initial_capacity = 8
//!
//! [state_machine]
//! trace_transitions = false
//! on_remove_current = "reject"   # or "reset_to_root"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::engine::error::ConfigError;


/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoreConfig {
    /// Component registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// State machine settings.
    #[serde(default)]
    pub state_machine: MachineConfig,
}

impl CoreConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Component registry settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegistryConfig {
    /// Number of components the map is pre-sized for.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

fn default_initial_capacity() -> usize {
    8
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
        }
    }
}

/// What `remove_state` does when asked to remove the current state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveCurrentPolicy {
    /// Refuse the removal; the machine is left untouched.
    #[default]
    Reject,
    /// Switch to the root state first, then remove.
    ResetToRoot,
}

/// State machine settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MachineConfig {
    /// Log every state switch at `debug` level.
    #[serde(default)]
    pub trace_transitions: bool,

    /// Behaviour of `remove_state` on the current state.
    #[serde(default)]
    pub on_remove_current: RemoveCurrentPolicy,
}
