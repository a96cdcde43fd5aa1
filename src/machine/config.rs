//! Runtime policy for a machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a `MachineConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid machine configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How the runtime reacts to firings that do not complete.
///
/// Missing keys take their defaults, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Strict mode: an event with no winning rule is an
    /// `InvalidTransition` error instead of `Outcome::Failed`.
    pub whiny_transitions: bool,

    /// A rejected state write is a `PersistenceFailed` error instead of
    /// `Outcome::NotPersisted`.
    pub whiny_persistence: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            whiny_transitions: true,
            whiny_persistence: false,
        }
    }
}

impl MachineConfig {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn silent() -> Self {
        Self {
            whiny_transitions: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
