//! On-disk storage for the bot's JSON caches.
//!
//! The bot keeps its persistent state as small JSON files in the cache directory:
//! one merged key-value record per guild and one OAuth token file per Twitch
//! credential. Writes are read-merge-write with shallow key overwrite; there is no
//! in-process locking, the cross-process instance lock is the only exclusion.

pub mod guild_cache;
pub mod token;

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::cache::CacheError;

/// Creates a directory and all of its parents if missing.
///
/// Idempotent: succeeds if the directory already exists.
pub async fn ensure_dir(path: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(path).await
}

/// How to treat a missing JSON object file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingFile {
    /// Write `{}` to disk and return an empty object.
    Create,
    /// Return an empty object and leave the filesystem untouched.
    Ignore,
}

/// Reads a file holding a single JSON object.
async fn read_object(path: &Path, missing: MissingFile) -> Result<Map<String, Value>, CacheError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if missing == MissingFile::Create {
                tokio::fs::write(path, "{}")
                    .await
                    .map_err(|source| CacheError::Io {
                        path: path.to_path_buf(),
                        source,
                    })?;
            }
            return Ok(Map::new());
        }
        Err(source) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let value: Value = serde_json::from_str(&content).map_err(|source| CacheError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CacheError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Merges `patch` into the object stored at `path` and writes it back as pretty JSON.
///
/// Keys present in `patch` overwrite existing keys; all other keys are preserved.
/// Returns the merged object.
async fn merge_object(
    path: &Path,
    patch: Map<String, Value>,
    missing: MissingFile,
) -> Result<Map<String, Value>, CacheError> {
    let mut merged = read_object(path, missing).await?;
    merged.extend(patch);

    let content =
        serde_json::to_string_pretty(&merged).map_err(|source| CacheError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    tokio::fs::write(path, content)
        .await
        .map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(merged)
}

#[cfg(test)]
mod test;
