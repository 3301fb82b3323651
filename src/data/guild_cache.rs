//! Guild cache repository.
//!
//! Each configured guild has a `guild_<id>.json` record in the cache directory. The
//! record is a flat JSON object; the bot currently uses `commandHash` (the hash of
//! the last deployed command set) and `livestreamsLastLive` (when each streamer was
//! last seen live). Unknown keys are preserved across writes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use serenity::all::GuildId;

use crate::{
    data::{ensure_dir, merge_object, read_object, MissingFile},
    error::cache::CacheError,
};

const COMMAND_HASH: &str = "commandHash";
const LIVESTREAMS_LAST_LIVE: &str = "livestreamsLastLive";

/// Cache record of a single guild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuildCache(Map<String, Value>);

impl GuildCache {
    /// Hash of the command set last deployed to the guild.
    pub fn command_hash(&self) -> Option<&str> {
        self.0.get(COMMAND_HASH).and_then(Value::as_str)
    }

    /// Last time each streamer was seen live, keyed by their display name.
    ///
    /// Entries that are not valid RFC 3339 timestamps are ignored.
    pub fn livestreams_last_live(&self) -> BTreeMap<String, DateTime<Utc>> {
        let Some(Value::Object(entries)) = self.0.get(LIVESTREAMS_LAST_LIVE) else {
            return BTreeMap::new();
        };

        entries
            .iter()
            .filter_map(|(user, value)| {
                let timestamp = DateTime::parse_from_rfc3339(value.as_str()?).ok()?;
                Some((user.clone(), timestamp.with_timezone(&Utc)))
            })
            .collect()
    }

    /// Raw value of a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Set of keys to merge into a guild's cache record.
#[derive(Debug, Clone, Default)]
pub struct GuildCachePatch(Map<String, Value>);

impl GuildCachePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command_hash(self, hash: impl Into<String>) -> Self {
        self.set(COMMAND_HASH, Value::String(hash.into()))
    }

    /// Replaces the whole last-live map.
    ///
    /// The merge is shallow, so callers pass the complete map (existing entries
    /// plus updates), not only the changed users.
    pub fn livestreams_last_live(self, last_live: &BTreeMap<String, DateTime<Utc>>) -> Self {
        let entries = last_live
            .iter()
            .map(|(user, timestamp)| (user.clone(), Value::String(timestamp.to_rfc3339())))
            .collect();
        self.set(LIVESTREAMS_LAST_LIVE, Value::Object(entries))
    }

    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }
}

impl From<Map<String, Value>> for GuildCachePatch {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Repository providing read and merge-write access to guild cache records.
pub struct GuildCacheRepository<'a> {
    cache_dir: &'a Path,
}

impl<'a> GuildCacheRepository<'a> {
    /// Creates a new GuildCacheRepository instance.
    ///
    /// # Arguments
    /// - `cache_dir` - Cache directory holding the `guild_<id>.json` files
    ///
    /// # Returns
    /// - `GuildCacheRepository` - New repository instance
    pub fn new(cache_dir: &'a Path) -> Self {
        Self { cache_dir }
    }

    /// Path of the cache file for a guild.
    pub fn path(&self, guild_id: GuildId) -> PathBuf {
        self.cache_dir.join(format!("guild_{}.json", guild_id))
    }

    /// Reads the cache record of a guild.
    ///
    /// If no cache file exists yet, an empty file is created and an empty record is
    /// returned.
    ///
    /// # Arguments
    /// - `guild_id` - Discord guild ID
    ///
    /// # Returns
    /// - `Ok(GuildCache)` - Stored record, empty for a fresh guild
    /// - `Err(CacheError)` - The file could not be read, created or parsed
    pub async fn read(&self, guild_id: GuildId) -> Result<GuildCache, CacheError> {
        self.ensure_cache_dir().await?;
        let map = read_object(&self.path(guild_id), MissingFile::Create).await?;
        Ok(GuildCache(map))
    }

    /// Merges a patch into the cache record of a guild.
    ///
    /// Keys in the patch overwrite existing keys; other keys are kept. Concurrent
    /// writers to the same guild race and the last write wins.
    ///
    /// # Arguments
    /// - `guild_id` - Discord guild ID
    /// - `patch` - Keys to set
    ///
    /// # Returns
    /// - `Ok(GuildCache)` - The merged record as written to disk
    /// - `Err(CacheError)` - The existing record could not be read or the new one written
    pub async fn write(
        &self,
        guild_id: GuildId,
        patch: GuildCachePatch,
    ) -> Result<GuildCache, CacheError> {
        self.ensure_cache_dir().await?;
        let merged = merge_object(&self.path(guild_id), patch.0, MissingFile::Create).await?;
        Ok(GuildCache(merged))
    }

    async fn ensure_cache_dir(&self) -> Result<(), CacheError> {
        ensure_dir(self.cache_dir)
            .await
            .map_err(|source| CacheError::Io {
                path: self.cache_dir.to_path_buf(),
                source,
            })
    }
}
