use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::trace;

use crate::error::{Result, TodoError};

/// Exclusive advisory lock on the `.todo` directory. Only one mutating
/// command may hold it; dropping the guard releases it.
#[derive(Debug)]
pub struct DirLock {
    file: File,
    path: PathBuf,
}

impl DirLock {
    /// Take the lock without waiting; a holder elsewhere yields `Locked`.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        file.try_lock_exclusive()
            .map_err(|_| TodoError::Locked(path.display().to_string()))?;
        trace!(path = %path.display(), "lock acquired");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release now and report unlock failures instead of ignoring them in Drop.
    pub fn release(self) -> Result<()> {
        FileExt::unlock(&self.file)?;
        trace!(path = %self.path.display(), "lock released");
        Ok(())
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
