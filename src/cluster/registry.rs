//! Cluster registry: in-memory aggregate of registered clusters.

use crate::cluster::record::{ClusterId, ClusterRecord};
use crate::cluster::storage::ClusterStorage;
use crate::error::{ApiError, StorageError};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Read-only lookup used by the deletion flow.
pub trait ClusterRepository: Send + Sync {
    fn get(&self, id: &ClusterId) -> Option<ClusterRecord>;
}

/// Cluster registry for managing cluster records
///
/// Holds the records plus the advisory deleting flags, and delegates
/// persistence to the storage port. Deleting flags are never persisted.
pub struct ClusterRegistry {
    clusters: BTreeMap<ClusterId, ClusterRecord>,
    deleting: HashSet<ClusterId>,
    storage: Arc<dyn ClusterStorage>,
}

/// Registry shared between the registry server and readers.
pub type SharedClusterRegistry = Arc<RwLock<ClusterRegistry>>;

impl ClusterRegistry {
    /// Create an empty registry backed by `storage` without loading it.
    pub fn with_storage(storage: Arc<dyn ClusterStorage>) -> Self {
        Self {
            clusters: BTreeMap::new(),
            deleting: HashSet::new(),
            storage,
        }
    }

    /// Create a registry and load every stored record.
    pub fn load(storage: Arc<dyn ClusterStorage>) -> Result<Self, StorageError> {
        let mut registry = Self::with_storage(storage);
        registry.reload()?;
        Ok(registry)
    }

    /// Replace the in-memory records with what storage holds now.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        let records = self.storage.load()?;
        self.replace_records(records);
        Ok(())
    }

    pub fn into_shared(self) -> SharedClusterRegistry {
        Arc::new(RwLock::new(self))
    }

    pub fn get(&self, id: &ClusterId) -> Option<&ClusterRecord> {
        self.clusters.get(id)
    }

    /// All records ordered by id.
    pub fn list(&self) -> Vec<&ClusterRecord> {
        self.clusters.values().collect()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Register and persist a new record.
    ///
    /// Other processes may have written the store since it was loaded, so the
    /// record is added to the stored set, not to this snapshot.
    pub fn add(&mut self, record: ClusterRecord) -> Result<(), ApiError> {
        let mut exists = false;
        let records = self.storage.update(&mut |records| {
            exists = records.iter().any(|r| r.id == record.id);
            if !exists {
                records.push(record.clone());
            }
            !exists
        })?;
        self.replace_records(records);
        if exists {
            return Err(ApiError::ClusterExists(record.id));
        }
        Ok(())
    }

    /// Remove from the stored set. Returns the removed record, if any.
    pub fn remove(&mut self, id: &ClusterId) -> Result<Option<ClusterRecord>, StorageError> {
        self.deleting.remove(id);
        let mut removed = None;
        let records = self.storage.update(&mut |records| {
            removed = records
                .iter()
                .position(|r| &r.id == id)
                .map(|index| records.remove(index));
            removed.is_some()
        })?;
        self.replace_records(records);
        Ok(removed)
    }

    pub fn set_deleting(&mut self, id: &ClusterId) {
        self.deleting.insert(id.clone());
    }

    pub fn clear_deleting(&mut self, id: &ClusterId) {
        self.deleting.remove(id);
    }

    pub fn is_deleting(&self, id: &ClusterId) -> bool {
        self.deleting.contains(id)
    }

    /// Ids with a deletion in flight, sorted.
    pub fn deleting(&self) -> Vec<ClusterId> {
        let mut ids: Vec<ClusterId> = self.deleting.iter().cloned().collect();
        ids.sort();
        ids
    }

    fn replace_records(&mut self, records: Vec<ClusterRecord>) {
        self.clusters = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
    }
}

impl ClusterRepository for RwLock<ClusterRegistry> {
    fn get(&self, id: &ClusterId) -> Option<ClusterRecord> {
        self.read().get(id).cloned()
    }
}
