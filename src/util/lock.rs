//! Single-instance lock on the cache directory.
//!
//! Only one bot process may use a cache directory at a time, since guild caches and
//! token files are written without any further coordination. The lock is a
//! `__dir.lock` file that the holder touches every few seconds; a lock file whose
//! modification time is older than the stale threshold belongs to a dead process
//! and is taken over.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;

use crate::error::lock::LockError;

/// Name of the lock file inside the locked directory.
pub const LOCK_FILE_NAME: &str = "__dir.lock";

/// A lock file untouched for this long is considered abandoned.
pub const STALE_AFTER: Duration = Duration::from_secs(10);

/// Interval at which the holder refreshes the lock file.
pub const REFRESH_EVERY: Duration = Duration::from_secs(2);

/// Held directory lock.
///
/// The lock is kept fresh by a background task and released when dropped.
#[derive(Debug)]
pub struct DirectoryLock {
    path: PathBuf,
    refresher: JoinHandle<()>,
}

impl DirectoryLock {
    /// Acquires the lock on a directory, creating the directory if needed.
    ///
    /// Must be called from within a tokio runtime, which drives the refresh task.
    ///
    /// # Arguments
    /// - `dir` - Directory to lock
    ///
    /// # Returns
    /// - `Ok(DirectoryLock)` - Lock acquired
    /// - `Err(LockError::Held)` - Another live process holds the lock
    /// - `Err(LockError::Io)` - The lock file could not be created or inspected
    pub async fn acquire(dir: &Path) -> Result<Self, LockError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| LockError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        let path = dir.join(LOCK_FILE_NAME);

        if !try_create(&path).await? {
            if !is_stale(&path).await? {
                return Err(LockError::Held { path });
            }

            tracing::warn!("Taking over stale lock file {}", path.display());
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(LockError::Io { path, source }),
            }

            if !try_create(&path).await? {
                return Err(LockError::Held { path });
            }
        }

        tracing::debug!("Acquired lock {}", path.display());

        let refresher = tokio::spawn(refresh_loop(path.clone()));

        Ok(Self { path, refresher })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        self.refresher.abort();
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

/// Creates the lock file if it does not exist yet.
///
/// Returns `false` when the file already exists.
async fn try_create(path: &Path) -> Result<bool, LockError> {
    let result = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await;

    match result {
        Ok(_) => {
            write_stamp(path).await?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(source) => Err(LockError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn is_stale(path: &Path) -> Result<bool, LockError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        // Released between our create attempt and now.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(source) => {
            return Err(LockError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let modified = metadata.modified().map_err(|source| LockError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // A modification time in the future counts as fresh.
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);

    Ok(age > STALE_AFTER)
}

/// Rewrites the lock file, which also bumps its modification time.
async fn write_stamp(path: &Path) -> Result<(), LockError> {
    tokio::fs::write(path, std::process::id().to_string())
        .await
        .map_err(|source| LockError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn refresh_loop(path: PathBuf) {
    let mut interval = tokio::time::interval(REFRESH_EVERY);
    // The first tick completes immediately and the file was just written.
    interval.tick().await;

    loop {
        interval.tick().await;
        if let Err(e) = write_stamp(&path).await {
            tracing::error!("Failed to refresh lock: {}", e);
        }
    }
}
