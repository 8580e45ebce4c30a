//! Configuration System
//!
//! Layered configuration: built-in defaults, the global config file, an
//! optional explicit file, then `CLUSTERDECK__*` environment variables.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod paths;
mod sources;
mod storage;

pub use facade::ConfigLoader;
pub use storage::StorageConfig;

/// XDG path helpers
pub mod xdg {
    pub use super::paths::xdg_root::*;
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where the cluster registry and hotbars are kept
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub deletion: DeletionConfig,
}

/// Settings for the deletion flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionConfig {
    /// How long a registry request may take before it counts as failed
    #[serde(default = "default_transport_timeout_ms")]
    pub transport_timeout_ms: u64,

    /// Prompt on the terminal for confirmation and reassignment
    #[serde(default = "default_interactive")]
    pub interactive: bool,
}

pub(crate) const DEFAULT_TRANSPORT_TIMEOUT_MS: u64 = 5_000;

fn default_transport_timeout_ms() -> u64 {
    DEFAULT_TRANSPORT_TIMEOUT_MS
}

fn default_interactive() -> bool {
    true
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            transport_timeout_ms: default_transport_timeout_ms(),
            interactive: default_interactive(),
        }
    }
}

impl DeletionConfig {
    pub fn transport_timeout(&self) -> Duration {
        Duration::from_millis(self.transport_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.transport_timeout_ms == 0 {
            return Err("transport_timeout_ms must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Logging(String),
    Storage(String),
    Deletion(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Deletion(msg) => write!(f, "Deletion: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl DeckConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }
        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }
        if let Err(e) = self.deletion.validate() {
            errors.push(ValidationError::Deletion(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
