//! Hotbars: named lists of pinned cluster shortcuts.
//!
//! Pins reference clusters by id only, so once a cluster is deleted its pins
//! must be purged or they dangle.

use crate::cluster::ClusterId;
use crate::deletion::ClusterReferenceCleanup;
use crate::error::StorageError;
use crate::persist::{atomic_replace, with_store_lock};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOTBAR: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotbarItem {
    pub cluster_id: ClusterId,
    pub pinned_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HotbarFile {
    #[serde(default)]
    hotbars: BTreeMap<String, Vec<HotbarItem>>,
}

/// Hotbar state, optionally persisted to a JSON file.
pub struct HotbarStore {
    state: Mutex<HotbarFile>,
    path: Option<PathBuf>,
}

impl HotbarStore {
    /// Store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(HotbarFile::default()),
            path: None,
        }
    }

    /// Load from `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let state = read_file(&path)?;
        Ok(Self {
            state: Mutex::new(state),
            path: Some(path),
        })
    }

    /// Pin a cluster to a hotbar. Pinning twice is a no-op.
    pub fn pin(&self, hotbar: &str, cluster_id: &ClusterId) -> Result<bool, StorageError> {
        self.update(|state| {
            let items = state.hotbars.entry(hotbar.to_string()).or_default();
            if items.iter().any(|i| &i.cluster_id == cluster_id) {
                return false;
            }
            items.push(HotbarItem {
                cluster_id: cluster_id.clone(),
                pinned_at: Utc::now(),
            });
            true
        })
    }

    pub fn unpin(&self, hotbar: &str, cluster_id: &ClusterId) -> Result<bool, StorageError> {
        self.update(|state| {
            let Some(items) = state.hotbars.get_mut(hotbar) else {
                return false;
            };
            let before = items.len();
            items.retain(|i| &i.cluster_id != cluster_id);
            items.len() != before
        })
    }

    /// Items of one hotbar in pin order.
    pub fn items(&self, hotbar: &str) -> Vec<HotbarItem> {
        self.state
            .lock()
            .hotbars
            .get(hotbar)
            .cloned()
            .unwrap_or_default()
    }

    pub fn hotbar_names(&self) -> Vec<String> {
        self.state.lock().hotbars.keys().cloned().collect()
    }

    /// Remove every pin of `cluster_id` across all hotbars. Returns how many went.
    pub fn remove_all_items(&self, cluster_id: &ClusterId) -> Result<usize, StorageError> {
        let mut removed = 0;
        self.update(|state| {
            for items in state.hotbars.values_mut() {
                let before = items.len();
                items.retain(|i| &i.cluster_id != cluster_id);
                removed += before - items.len();
            }
            removed > 0
        })?;
        Ok(removed)
    }

    /// Apply `change` to the latest stored state and save when it reports a
    /// change. Persisted stores re-read the file under its lock marker first,
    /// so pins written by other processes are kept.
    fn update<F>(&self, change: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut HotbarFile) -> bool,
    {
        let mut state = self.state.lock();
        let Some(path) = &self.path else {
            return Ok(change(&mut *state));
        };
        with_store_lock(path, || {
            *state = read_file(path)?;
            let changed = change(&mut *state);
            if changed {
                write_file(path, &state)?;
            }
            Ok(changed)
        })
    }
}

fn read_file(path: &Path) -> Result<HotbarFile, StorageError> {
    if !path.exists() {
        return Ok(HotbarFile::default());
    }
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_file(path: &Path, state: &HotbarFile) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(state).map_err(|e| StorageError::Corrupt {
        path: path.to_path_buf(),
        message: format!("Failed to serialize hotbars: {}", e),
    })?;
    atomic_replace(path, &json)?;
    Ok(())
}

impl ClusterReferenceCleanup for HotbarStore {
    fn purge_cluster_references(&self, cluster_id: &ClusterId) {
        match self.remove_all_items(cluster_id) {
            Ok(0) => {}
            Ok(n) => tracing::debug!(cluster_id = %cluster_id, removed = n, "Purged hotbar pins"),
            Err(e) => tracing::warn!(cluster_id = %cluster_id, "Failed to purge hotbar pins: {}", e),
        }
    }
}
