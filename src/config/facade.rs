//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::DeckConfig;
use config::ConfigError;
use std::path::{Path, PathBuf};

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Path of the global config file, if a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        super::sources::global_file::global_config_path()
    }

    /// Load configuration from the global file and environment.
    pub fn load() -> Result<DeckConfig, ConfigError> {
        MergeService::load(None)
    }

    /// Load configuration with an explicit file layered over the global one.
    pub fn load_from_file(path: &Path) -> Result<DeckConfig, ConfigError> {
        MergeService::load(Some(path))
    }

    /// Create default configuration.
    pub fn default() -> DeckConfig {
        DeckConfig::default()
    }
}
