//! File-backed advisory mutex
//!
//! One `FileMutex` owns one `<key>.lockfile`. Exclusion comes from the OS
//! advisory lock on the descriptor; the `Locked`/`Unlocked` text in the file is
//! informational only. Works across processes on a single host.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const LOCKED_MARKER: &[u8] = b"Locked\n";
const UNLOCKED_MARKER: &[u8] = b"Unlocked\n";

pub type MutexResult<T> = Result<T, MutexError>;

#[derive(Debug, Error)]
pub enum MutexError {
    #[error("invalid lock key {key:?}: use letters, digits, '.', '_' or '-'")]
    InvalidKey { key: String },

    #[error("failed to open lock file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to lock {path}: {source}")]
    Lock { path: PathBuf, source: io::Error },

    #[error("failed to write lock marker to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to unlock {path}: {source}")]
    Unlock { path: PathBuf, source: io::Error },
}

#[derive(Debug)]
pub struct FileMutex {
    file: File,
    path: PathBuf,
    own: bool,
}

impl FileMutex {
    /// Opens (creating if needed) `<dir>/<key>.lockfile`. Does not lock.
    ///
    /// `key` must name a file directly inside `dir`: separators, a leading
    /// dot and anything outside `[A-Za-z0-9._-]` are rejected.
    pub fn acquire(dir: impl AsRef<Path>, key: &str) -> MutexResult<Self> {
        if !is_valid_key(key) {
            return Err(MutexError::InvalidKey {
                key: key.to_string(),
            });
        }
        let path = dir.as_ref().join(format!("{}.lockfile", key));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| MutexError::Open {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            file,
            path,
            own: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_locked(&self) -> bool {
        self.own
    }

    /// Blocks until the exclusive lock is granted.
    pub fn lock(&mut self) -> MutexResult<()> {
        FileExt::lock_exclusive(&self.file).map_err(|source| MutexError::Lock {
            path: self.path.clone(),
            source,
        })?;
        self.own = true;
        self.write_marker(LOCKED_MARKER)?;
        debug!(path = %self.path.display(), "file mutex locked");
        Ok(())
    }

    /// Returns `Ok(false)` when another holder has the lock.
    pub fn try_lock(&mut self) -> MutexResult<bool> {
        match FileExt::try_lock_exclusive(&self.file) {
            Ok(()) => {}
            Err(e) if is_contended(&e) => return Ok(false),
            Err(source) => {
                return Err(MutexError::Lock {
                    path: self.path.clone(),
                    source,
                })
            }
        }
        self.own = true;
        self.write_marker(LOCKED_MARKER)?;
        debug!(path = %self.path.display(), "file mutex locked");
        Ok(true)
    }

    pub fn unlock(&mut self) -> MutexResult<bool> {
        self.release_lock()
    }

    /// Releases the lock if this instance holds it. `Ok(false)` means there was
    /// nothing to release.
    pub fn release_lock(&mut self) -> MutexResult<bool> {
        if !self.own {
            return Ok(false);
        }
        FileExt::unlock(&self.file).map_err(|source| MutexError::Unlock {
            path: self.path.clone(),
            source,
        })?;
        self.own = false;
        self.write_marker(UNLOCKED_MARKER)?;
        debug!(path = %self.path.display(), "file mutex released");
        Ok(true)
    }

    /// Runs `f` while holding the lock. The lock is released before the value
    /// is returned, whatever `f` produced.
    pub fn run_exclusive<T, F>(&mut self, f: F) -> MutexResult<T>
    where
        F: FnOnce() -> T,
    {
        self.lock()?;
        let value = f();
        self.release_lock()?;
        Ok(value)
    }

    fn write_marker(&mut self, marker: &[u8]) -> MutexResult<()> {
        let write = |file: &mut File| -> io::Result<()> {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(marker)?;
            file.flush()
        };
        write(&mut self.file).map_err(|source| MutexError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl Drop for FileMutex {
    fn drop(&mut self) {
        if self.own {
            if let Err(e) = self.release_lock() {
                warn!(error = %e, "failed to release file mutex on drop");
            }
        }
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn acquire_creates_lock_file_without_locking() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mutex = FileMutex::acquire(dir.path(), "orders").expect("acquire");

        assert!(mutex.path().ends_with("orders.lockfile"));
        assert!(mutex.path().exists());
        assert!(!mutex.is_locked());
    }

    #[test]
    fn lock_writes_locked_marker() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut mutex = FileMutex::acquire(dir.path(), "orders").expect("acquire");
        mutex.lock().expect("lock");

        assert!(mutex.is_locked());
        assert_eq!(fs::read_to_string(mutex.path()).unwrap(), "Locked\n");
    }

    #[test]
    fn unlock_when_not_held_is_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut mutex = FileMutex::acquire(dir.path(), "orders").expect("acquire");

        assert!(!mutex.unlock().expect("unlock"));
        assert_eq!(fs::read_to_string(mutex.path()).unwrap(), "");
    }

    #[test]
    fn second_release_reports_not_owned() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut mutex = FileMutex::acquire(dir.path(), "orders").expect("acquire");
        mutex.lock().expect("lock");

        assert!(mutex.release_lock().expect("release"));
        assert!(!mutex.release_lock().expect("release again"));
        assert_eq!(fs::read_to_string(mutex.path()).unwrap(), "Unlocked\n");
    }

    #[test]
    fn keys_cannot_leave_the_lock_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        for key in ["../escape", "a/b", "a\\b", "", ".hidden", "/etc/passwd"] {
            assert!(
                matches!(
                    FileMutex::acquire(dir.path(), key),
                    Err(MutexError::InvalidKey { .. })
                ),
                "key {key:?} should be rejected"
            );
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(FileMutex::acquire(dir.path(), "cart_900.v2-refund").is_ok());
    }
}
