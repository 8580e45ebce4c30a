//! Storage locations for the cluster registry and the hotbars.

use super::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CLUSTERS_FILE: &str = "clusters.json";
const HOTBAR_FILE: &str = "hotbar.json";

/// Storage configuration. Unset paths resolve under `$XDG_DATA_HOME/clusterdeck/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub clusters_file: Option<PathBuf>,

    #[serde(default)]
    pub hotbar_file: Option<PathBuf>,
}

/// Concrete storage paths after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub clusters_file: PathBuf,
    pub hotbar_file: PathBuf,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, path) in [
            ("clusters_file", &self.clusters_file),
            ("hotbar_file", &self.hotbar_file),
        ] {
            if path.as_deref().is_some_and(|p| p.as_os_str().is_empty()) {
                return Err(format!("{} cannot be empty", name));
            }
        }
        Ok(())
    }

    pub fn resolve_paths(&self) -> Result<StoragePaths, ApiError> {
        let needs_default = self.clusters_file.is_none() || self.hotbar_file.is_none();
        let data_dir = if needs_default {
            Some(xdg::app_data_dir()?)
        } else {
            None
        };
        let pick = |explicit: &Option<PathBuf>, file: &str| -> PathBuf {
            match (explicit, &data_dir) {
                (Some(p), _) => p.clone(),
                (None, Some(dir)) => dir.join(file),
                (None, None) => Path::new(file).to_path_buf(),
            }
        };
        Ok(StoragePaths {
            clusters_file: pick(&self.clusters_file, CLUSTERS_FILE),
            hotbar_file: pick(&self.hotbar_file, HOTBAR_FILE),
        })
    }
}
