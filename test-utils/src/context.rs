use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use crate::error::TestError;

/// Test context owning a temporary directory with config and cache subdirectories.
///
/// The directory and everything in it is removed when the context is dropped, so
/// keep the context alive for the duration of the test.
pub struct TestContext {
    /// Root temporary directory.
    root: TempDir,

    /// Directory that plays the role of `--cfg-path`.
    config_dir: PathBuf,

    /// Directory that plays the role of `--cfg-cache`.
    cache_dir: PathBuf,
}

impl TestContext {
    /// Creates a new context with empty config and cache directories.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context with both directories created
    /// - `Err(TestError::Io)` - Failed to create the temporary directory
    pub fn new() -> Result<Self, TestError> {
        let root = tempfile::tempdir()?;
        let config_dir = root.path().join("config");
        let cache_dir = root.path().join("cache");
        std::fs::create_dir_all(&config_dir)?;
        std::fs::create_dir_all(&cache_dir)?;

        Ok(Self {
            root,
            config_dir,
            cache_dir,
        })
    }

    /// Root of the temporary directory tree.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Config directory containing `config.json` when one was configured.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Cache directory containing guild caches, token files and the lock file.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Writes a config document as pretty JSON.
    pub fn write_config(&self, config: &Value) -> Result<(), TestError> {
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(self.config_dir.join("config.json"), content)?;
        Ok(())
    }

    /// Writes a guild cache record, replacing any existing one.
    pub fn write_guild_cache(&self, guild_id: u64, record: &Value) -> Result<(), TestError> {
        let content = serde_json::to_string_pretty(record)?;
        std::fs::write(self.guild_cache_path(guild_id), content)?;
        Ok(())
    }

    /// Reads a guild cache record back from disk.
    ///
    /// # Returns
    /// - `Ok(Some(Value))` - Parsed content of `guild_<id>.json`
    /// - `Ok(None)` - No cache file exists for the guild
    /// - `Err(TestError)` - The file exists but could not be read or parsed
    pub fn read_guild_cache(&self, guild_id: u64) -> Result<Option<Value>, TestError> {
        let path = self.guild_cache_path(guild_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Path of a guild's cache file.
    pub fn guild_cache_path(&self, guild_id: u64) -> PathBuf {
        self.cache_dir.join(format!("guild_{}.json", guild_id))
    }
}
