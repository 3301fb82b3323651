//! OAuth token cache.
//!
//! Tokens are stored as `token.json` or `token_<name>.json` in the cache directory.
//! The authorization code from the config can only be exchanged once, so losing this
//! file means the authorization flow has to be redone by hand.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    data::{merge_object, read_object, MissingFile},
    error::cache::CacheError,
};

/// An OAuth access token as persisted on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Vec<String>,
    /// Lifetime in seconds, counted from `obtainment_timestamp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Unix timestamp in milliseconds at which the token was obtained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obtainment_timestamp: Option<i64>,
}

impl StoredToken {
    /// Returns whether the token is expired at `now_ms`, with a safety margin.
    ///
    /// Tokens without expiry information are treated as valid.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        const MARGIN_MS: i64 = 60_000;

        match (self.expires_in, self.obtainment_timestamp) {
            (Some(expires_in), Some(obtained)) => {
                now_ms + MARGIN_MS >= obtained + (expires_in as i64) * 1000
            }
            _ => false,
        }
    }
}

/// Repository for token files.
pub struct TokenRepository<'a> {
    cache_dir: &'a Path,
}

impl<'a> TokenRepository<'a> {
    pub fn new(cache_dir: &'a Path) -> Self {
        Self { cache_dir }
    }

    /// Path of the token file for a token name.
    pub fn path(&self, name: Option<&str>) -> PathBuf {
        match name {
            Some(name) => self.cache_dir.join(format!("token_{}.json", name)),
            None => self.cache_dir.join("token.json"),
        }
    }

    /// Reads a stored token.
    ///
    /// # Returns
    /// - `Ok(StoredToken)` - Stored token, or an empty token if no file exists
    /// - `Err(CacheError)` - The file exists but could not be read or parsed
    pub async fn read(&self, name: Option<&str>) -> Result<StoredToken, CacheError> {
        let path = self.path(name);
        let map = read_object(&path, MissingFile::Ignore).await?;
        serde_json::from_value(Value::Object(map))
            .map_err(|source| CacheError::Parse { path, source })
    }

    /// Merges a token into the stored token file.
    ///
    /// Fields absent from `token` keep their stored value, so a refresh response
    /// without a new refresh token does not erase the old one.
    pub async fn store(&self, name: Option<&str>, token: &StoredToken) -> Result<(), CacheError> {
        let path = self.path(name);
        let patch = match serde_json::to_value(token) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(CacheError::NotAnObject { path }),
            Err(source) => return Err(CacheError::Parse { path, source }),
        };
        merge_object(&path, patch, MissingFile::Ignore).await?;
        Ok(())
    }
}
