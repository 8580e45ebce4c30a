use crate::ipc::TransportError;
use crate::kubeconfig::{FileAccessError, KubeconfigError};
use crate::lock::LockError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a deletion attempt aborted.
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("missing read/write permissions for {path:?}")]
    PermissionDenied { path: PathBuf },

    #[error(transparent)]
    FileAccess(FileAccessError),

    #[error("lock already held for {path:?}")]
    LockConflict { path: PathBuf },

    #[error("permission denied creating lock {path:?}")]
    LockPermission { path: PathBuf },

    #[error("failed to create lock {path:?}: {source}")]
    LockOther {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] KubeconfigError),

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("reassignment cancelled by user")]
    UserCancelled,

    #[error("\"{name}\" is not a remaining context")]
    InvalidSelection { name: String },

    #[error("failed to write {path:?}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DeleteError {
    /// Text shown to the user, or `None` when the abort is silent.
    pub fn user_message(&self) -> Option<String> {
        let message = match self {
            Self::UserCancelled => return None,
            Self::PermissionDenied { path } => format!(
                "Cannot remove cluster, missing write permissions for {}",
                path.display()
            ),
            Self::FileAccess(e) => format!("Cannot remove cluster, {}", e),
            Self::LockConflict { .. } => {
                "Cannot remove cluster, failed to acquire lock file. Already held.".to_string()
            }
            Self::LockPermission { .. } => {
                "Cannot remove cluster, failed to acquire lock file. Permission denied.".to_string()
            }
            Self::LockOther { source, .. } => {
                format!("Cannot remove cluster, failed to acquire lock file. {}", source)
            }
            Self::Parse(e) => format!("Cannot remove cluster, failed to process config file. {}", e),
            Self::Read { source, .. } | Self::WriteFailure { source, .. } => {
                format!("Cannot remove cluster, failed to process config file. {}", source)
            }
            Self::InvalidSelection { name } => format!(
                "Cannot remove cluster, \"{}\" is not a remaining context.",
                name
            ),
            Self::Transport(e) => format!("Cannot remove cluster, {}", e),
        };
        Some(message)
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }
}

impl From<LockError> for DeleteError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Conflict { path } => Self::LockConflict { path },
            LockError::Permission { path, .. } => Self::LockPermission { path },
            LockError::Other { path, source } => Self::LockOther { path, source },
        }
    }
}

impl From<FileAccessError> for DeleteError {
    fn from(err: FileAccessError) -> Self {
        match err {
            FileAccessError::PermissionDenied { path } => Self::PermissionDenied { path },
            other => Self::FileAccess(other),
        }
    }
}
