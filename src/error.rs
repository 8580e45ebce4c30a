//! Error types for clusterdeck.
//!
//! `ApiError` is the application-level error surfaced by the CLI and the
//! loaders. The deletion protocol has its own taxonomy (`DeleteError`) because
//! every variant there is handled inside the coordinator rather than bubbled up.

use crate::cluster::ClusterId;
use std::path::PathBuf;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cluster not found: {0}")]
    ClusterNotFound(ClusterId),

    #[error("Corrupt store file {path:?}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Store file is locked: {0}")]
    Locked(#[from] crate::lock::LockError),
}

/// Application errors surfaced to the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Cluster not found: {0}")]
    ClusterNotFound(ClusterId),

    #[error("Cluster already registered: {0}")]
    ClusterExists(ClusterId),

    #[error("Context '{context}' not found in {path:?}")]
    ContextNotFound { path: PathBuf, context: String },

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(#[from] crate::kubeconfig::KubeconfigError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Transport error: {0}")]
    Transport(#[from] crate::ipc::TransportError),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Deletion of cluster {cluster_id} did not complete: {reason}")]
    DeletionAborted { cluster_id: ClusterId, reason: String },
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
