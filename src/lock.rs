//! Mutation lock for shared kubeconfig files.
//!
//! A lock is a zero-length sibling marker at `<absolute path>.lock`, created
//! with create-exclusive semantics. Its existence is the only signal that a
//! mutation is in progress; other processes honour it without sharing any
//! in-memory state with us.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const LOCK_SUFFIX: &str = ".lock";

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock already held: {path:?}")]
    Conflict { path: PathBuf },

    #[error("permission denied creating lock {path:?}: {source}")]
    Permission {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create lock {path:?}: {source}")]
    Other {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LockError {
    fn from_io(path: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::AlreadyExists | io::ErrorKind::IsADirectory => Self::Conflict { path },
            io::ErrorKind::PermissionDenied => Self::Permission { path, source: err },
            _ => Self::Other { path, source: err },
        }
    }
}

/// Acquires and releases file mutation locks.
#[derive(Debug, Default, Clone, Copy)]
pub struct LockManager;

impl LockManager {
    pub fn new() -> Self {
        Self
    }

    /// Marker path guarding `target`.
    pub fn lock_path_for(target: &Path) -> PathBuf {
        let absolute = std::path::absolute(target).unwrap_or_else(|_| target.to_path_buf());
        let mut name: OsString = absolute.into_os_string();
        name.push(LOCK_SUFFIX);
        PathBuf::from(name)
    }

    /// Take the lock for `target`, failing immediately if anyone holds it.
    pub fn acquire(&self, target: &Path) -> Result<LockToken, LockError> {
        let path = Self::lock_path_for(target);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                // Nothing is written; the handle is only needed to create the marker.
                drop(file);
                debug!(lock = %path.display(), "Acquired config lock");
                Ok(LockToken {
                    path,
                    released: false,
                })
            }
            Err(e) => {
                // A directory in the marker's place reports IsADirectory on
                // some platforms; it still means the path is taken.
                if e.kind() != io::ErrorKind::AlreadyExists && path.is_dir() {
                    return Err(LockError::Conflict { path });
                }
                Err(LockError::from_io(path, e))
            }
        }
    }

    /// Release a token. Never fails; problems are logged.
    pub fn release(&self, token: LockToken) {
        token.release();
    }
}

/// Exclusive ownership of one lock marker.
///
/// Dropping an unreleased token removes the marker, so every exit path of the
/// holder gives the lock back.
#[derive(Debug)]
pub struct LockToken {
    path: PathBuf,
    released: bool,
}

impl LockToken {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(lock = %self.path.display(), "Released config lock"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(lock = %self.path.display(), "Config lock already gone");
            }
            Err(e) => warn!(lock = %self.path.display(), "Failed to remove config lock: {}", e),
        }
    }
}

impl Drop for LockToken {
    fn drop(&mut self) {
        self.release_inner();
    }
}
