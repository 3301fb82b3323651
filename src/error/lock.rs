use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    /// Another live process holds the lock on the cache directory.
    #[error("Directory {} is locked by another instance", path.display())]
    Held { path: PathBuf },

    /// The lock file could not be created, inspected or refreshed.
    #[error("Failed to manage lock file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
