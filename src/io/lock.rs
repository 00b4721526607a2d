use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory file lock serializing writes to the store document.
///
/// Uses platform-native flock (Unix) to coordinate between the TUI and CLI
/// processes; both go through [`StoreLock`] before a read-modify-write.
pub struct StoreLock {
    _file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another deck process may be writing")]
    Timeout { path: PathBuf },
    #[error("lock error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lock file guarding the store in `dir`.
pub fn lock_path(dir: &Path) -> PathBuf {
    dir.join(".deck.lock")
}

impl StoreLock {
    /// Acquire the advisory lock for the store in `dir`, blocking up to
    /// `timeout`.
    pub fn acquire(dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = lock_path(dir);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::Create {
                path: path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => return Ok(StoreLock { _file: file, path }),
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => return Err(LockError::Timeout { path }),
            }
        }
    }

    /// Acquire with the default timeout (5 seconds).
    pub fn acquire_default(dir: &Path) -> Result<Self, LockError> {
        Self::acquire(dir, Duration::from_secs(5))
    }

    /// Single non-blocking attempt; `None` when someone else holds the lock.
    /// Used by the journal trim, which skips rather than waits.
    pub fn try_exclusive(dir: &Path) -> Option<Self> {
        let path = lock_path(dir);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .ok()?;
        try_lock(&file).ok()?;
        Some(StoreLock { _file: file, path })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // flock is released when the file closes; the lock file itself is
        // just a marker.
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
