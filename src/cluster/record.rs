use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Number of hex characters kept from the blake3 digest.
const CLUSTER_ID_LEN: usize = 16;

/// Stable identifier of a registered cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(String);

impl ClusterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Deterministic id for a (kubeconfig path, context) pair.
    ///
    /// The same context registered twice from the same file always maps to the
    /// same id, so re-adding is detected as a duplicate.
    pub fn derive(kubeconfig_path: &Path, context_name: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(kubeconfig_path.to_string_lossy().as_bytes());
        hasher.update(&[0]);
        hasher.update(context_name.as_bytes());
        let digest = hex::encode(hasher.finalize().as_bytes());
        Self(digest[..CLUSTER_ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClusterId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A registered cluster: one context in one kubeconfig file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub id: ClusterId,
    pub kubeconfig_path: PathBuf,
    pub context_name: String,
}

impl ClusterRecord {
    /// Build a record with its derived id.
    pub fn new(kubeconfig_path: impl Into<PathBuf>, context_name: impl Into<String>) -> Self {
        let kubeconfig_path = kubeconfig_path.into();
        let context_name = context_name.into();
        Self {
            id: ClusterId::derive(&kubeconfig_path, &context_name),
            kubeconfig_path,
            context_name,
        }
    }
}
