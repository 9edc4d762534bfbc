//! Exclusive lock on the working directories of a run.
//!
//! Two runs against the same directories would race on clearing and writing
//! documents, so a run holds an OS file lock in each directory until it ends.

use std::fs::{self, File, TryLockError};
use std::path::{Path, PathBuf};

use crate::error::{Result, TransferError};

/// Name of the lock file created in each working directory.
pub const LOCK_FILENAME: &str = ".monitor-transfer.lock";

/// Lock held on one directory. Released on drop, which also deletes the
/// lock file so the directory only holds documents afterwards.
#[derive(Debug)]
pub struct DirLock {
    file: File,
    dir: PathBuf,
    path: PathBuf,
}

impl DirLock {
    /// Lock `dir`, creating it if needed. Fails immediately if another
    /// holder has it.
    pub fn acquire(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| TransferError::fs(dir, e))?;

        let lock_path = dir.join(LOCK_FILENAME);
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| TransferError::fs(&lock_path, e))?;

        match file.try_lock() {
            Ok(()) => Ok(Self {
                file,
                dir: dir.to_path_buf(),
                path: lock_path,
            }),
            Err(TryLockError::WouldBlock) => Err(TransferError::Locked {
                path: dir.to_path_buf(),
            }),
            Err(TryLockError::Error(e)) => Err(TransferError::fs(&lock_path, e)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        // Delete while still holding the lock
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::debug!(file = %self.path.display(), error = %e, "Failed to remove lock file");
        }
        let _ = self.file.unlock();
    }
}

/// Locks on every working directory of a run.
#[derive(Debug)]
pub struct RunLock {
    locks: Vec<DirLock>,
}

impl RunLock {
    /// Lock each directory once, even when the same directory is listed twice.
    pub fn acquire(dirs: &[&Path]) -> Result<Self> {
        let mut locks: Vec<DirLock> = Vec::with_capacity(dirs.len());
        let mut seen: Vec<PathBuf> = Vec::with_capacity(dirs.len());

        for dir in dirs {
            fs::create_dir_all(dir).map_err(|e| TransferError::fs(*dir, e))?;
            let canonical = dir.canonicalize().map_err(|e| TransferError::fs(*dir, e))?;
            if seen.contains(&canonical) {
                continue;
            }
            locks.push(DirLock::acquire(dir)?);
            seen.push(canonical);
        }

        Ok(Self { locks })
    }

    pub fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.locks.iter().map(DirLock::dir)
    }
}
