//! MergeService: orchestrates sources, applies merge policy, deserializes to DeckConfig.

use crate::config::sources::{environment, global_file};
use crate::config::DeckConfig;
use config::{ConfigError, File};
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<DeckConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let mut builder = global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            builder = builder.add_source(File::from(path).required(true));
        }
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
