use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the on-disk JSON caches (guild cache, token cache).
#[derive(Error, Debug)]
pub enum CacheError {
    /// Reading or writing the cache file failed for a reason other than the file
    /// being absent.
    #[error("Failed to access cache file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file exists but does not contain valid JSON.
    #[error("Failed to parse cache file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The cache file holds valid JSON that is not an object.
    #[error("Cache file {} does not contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },
}
