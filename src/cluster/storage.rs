//! Cluster storage: persist and load registered cluster records.

use crate::cluster::record::ClusterRecord;
use crate::error::StorageError;
use crate::persist::{atomic_replace, ensure_parent_dir, with_store_lock};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CLUSTER_STORE_VERSION: u32 = 1;

pub trait ClusterStorage: Send + Sync {
    fn load(&self) -> Result<Vec<ClusterRecord>, StorageError>;
    fn save(&self, records: &[ClusterRecord]) -> Result<(), StorageError>;

    /// Load the current records, apply `change` and save if it returns true,
    /// as one step with respect to other writers. Returns the records as they
    /// stand afterwards.
    fn update(
        &self,
        change: &mut dyn FnMut(&mut Vec<ClusterRecord>) -> bool,
    ) -> Result<Vec<ClusterRecord>, StorageError> {
        let mut records = self.load()?;
        if change(&mut records) {
            self.save(&records)?;
        }
        Ok(records)
    }
}

/// On-disk layout of the cluster store.
#[derive(Debug, Serialize, Deserialize)]
struct ClusterStoreFile {
    version: u32,
    #[serde(default)]
    clusters: Vec<ClusterRecord>,
}

/// JSON file storage, by default `$XDG_DATA_HOME/clusterdeck/clusters.json`.
pub struct JsonClusterStorage {
    path: PathBuf,
}

impl JsonClusterStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClusterStorage for JsonClusterStorage {
    fn load(&self) -> Result<Vec<ClusterRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let bytes = std::fs::read(&self.path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let file: ClusterStoreFile =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        if file.version != CLUSTER_STORE_VERSION {
            return Err(StorageError::Corrupt {
                path: self.path.clone(),
                message: format!("unsupported store version {}", file.version),
            });
        }
        Ok(file.clusters)
    }

    fn save(&self, records: &[ClusterRecord]) -> Result<(), StorageError> {
        ensure_parent_dir(&self.path)?;
        let file = ClusterStoreFile {
            version: CLUSTER_STORE_VERSION,
            clusters: records.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: format!("Failed to serialize cluster store: {}", e),
        })?;
        atomic_replace(&self.path, &json)?;
        Ok(())
    }

    /// Other processes share this file, so the read and the write happen
    /// under the file's lock marker.
    fn update(
        &self,
        change: &mut dyn FnMut(&mut Vec<ClusterRecord>) -> bool,
    ) -> Result<Vec<ClusterRecord>, StorageError> {
        with_store_lock(&self.path, || {
            let mut records = self.load()?;
            if change(&mut records) {
                self.save(&records)?;
            }
            Ok(records)
        })
    }
}

/// In-memory storage for embedding and tests.
#[derive(Default)]
pub struct MemoryClusterStorage {
    records: Mutex<Vec<ClusterRecord>>,
}

impl MemoryClusterStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ClusterRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn snapshot(&self) -> Vec<ClusterRecord> {
        self.records.lock().clone()
    }
}

impl ClusterStorage for MemoryClusterStorage {
    fn load(&self) -> Result<Vec<ClusterRecord>, StorageError> {
        Ok(self.records.lock().clone())
    }

    fn save(&self, records: &[ClusterRecord]) -> Result<(), StorageError> {
        *self.records.lock() = records.to_vec();
        Ok(())
    }

    fn update(
        &self,
        change: &mut dyn FnMut(&mut Vec<ClusterRecord>) -> bool,
    ) -> Result<Vec<ClusterRecord>, StorageError> {
        let mut records = self.records.lock();
        change(&mut *records);
        Ok(records.clone())
    }
}
