//! Atomic file replacement shared by every writer in the crate.
//!
//! Contents are written to a uniquely named temp file in the destination
//! directory and renamed over the destination. Readers of the destination see
//! either the old or the new bytes, never a partial write.

use crate::lock::{LockError, LockManager};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// How long a store update waits out another writer's marker.
const STORE_LOCK_WAIT: Duration = Duration::from_secs(2);
const STORE_LOCK_POLL: Duration = Duration::from_millis(10);

/// Replace `path` with `contents` via write-to-temp then rename.
///
/// The temp file lives next to `path` so the rename never crosses a filesystem
/// boundary. On any failure the temp file is removed and `path` is untouched.
pub fn atomic_replace(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path has no file name: {:?}", path),
            )
        })?;

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(dir)?;

    temp.write_all(contents)?;
    temp.as_file().sync_all()?;

    // Keep the target's permission bits; a fresh temp file is 0600.
    if let Ok(meta) = fs::metadata(path) {
        if let Err(e) = fs::set_permissions(temp.path(), meta.permissions()) {
            tracing::debug!(path = %path.display(), "Could not copy permissions to temp file: {}", e);
        }
    }

    // NamedTempFile deletes itself when persist fails and the error is dropped.
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Run a read-modify-write of `path` while holding its lock marker.
///
/// Store files are small and rewritten quickly, so a held marker is polled
/// for a short while before giving up with `LockError::Conflict`.
pub fn with_store_lock<T, E>(path: &Path, update: impl FnOnce() -> Result<T, E>) -> Result<T, E>
where
    E: From<LockError> + From<io::Error>,
{
    ensure_parent_dir(path)?;
    let locks = LockManager::new();
    let deadline = Instant::now() + STORE_LOCK_WAIT;
    let token = loop {
        match locks.acquire(path) {
            Ok(token) => break token,
            Err(LockError::Conflict { .. }) if Instant::now() < deadline => {
                std::thread::sleep(STORE_LOCK_POLL);
            }
            Err(e) => return Err(e.into()),
        }
    };
    let result = update();
    locks.release(token);
    result
}
