//! Filesystem port for reading and replacing kubeconfig files.

use crate::persist::atomic_replace;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a kubeconfig cannot be both read and written.
#[derive(Debug, Error)]
pub enum FileAccessError {
    #[error("missing read/write permissions for {path:?}")]
    PermissionDenied { path: PathBuf },

    #[error("file not found: {path:?}")]
    NotFound { path: PathBuf },

    #[error("cannot access {path:?}: {source}")]
    Other {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileAccessError {
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            _ => Self::Other {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

pub trait ConfigFileStore: Send + Sync {
    /// Verify the file can be read and written without changing it.
    fn check_access(&self, path: &Path) -> Result<(), FileAccessError>;

    fn read(&self, path: &Path) -> io::Result<String>;

    /// Replace the file contents atomically. The target is never opened for
    /// writing; a failure before the final rename leaves it byte-identical.
    fn replace(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Local filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsConfigFileStore;

impl FsConfigFileStore {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigFileStore for FsConfigFileStore {
    fn check_access(&self, path: &Path) -> Result<(), FileAccessError> {
        // Opening read+write without create/truncate exercises both rights
        // and leaves the contents and mtime alone.
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map(drop)
            .map_err(|e| FileAccessError::from_io(path, e))
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn replace(&self, path: &Path, contents: &str) -> io::Result<()> {
        atomic_replace(path, contents.as_bytes())
    }
}
