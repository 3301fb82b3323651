use serde_json::Value;

use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with customizable fixture files.
///
/// Provides a fluent interface for configuring test environments backed by a
/// temporary directory. Use the builder pattern to add a config document and guild
/// cache records, then call `build()` to create the configured test context.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::{builder::TestBuilder, factory};
///
/// let test = TestBuilder::new()
///     .with_config(factory::config::create_config())
///     .with_guild_cache(123, serde_json::json!({"a": 1}))
///     .build()?;
/// ```
#[derive(Default)]
pub struct TestBuilder {
    /// Content written to `config.json` in the config directory, if any.
    config: Option<Value>,

    /// Raw `config.json` content, used to test parse failures.
    raw_config: Option<String>,

    /// Guild cache records written as `guild_<id>.json` in the cache directory.
    guild_caches: Vec<(u64, Value)>,

    /// Arbitrary files written to the cache directory.
    cache_files: Vec<(String, String)>,
}

impl TestBuilder {
    /// Creates a new test builder with no fixture files.
    ///
    /// # Returns
    /// - New `TestBuilder` instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the given document as `config.json` when the context is built.
    ///
    /// # Arguments
    /// - `config` - Config document, usually from `factory::config`
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Writes raw text as `config.json`, bypassing JSON serialization.
    ///
    /// Useful for testing malformed configuration files.
    pub fn with_raw_config(mut self, content: impl Into<String>) -> Self {
        self.raw_config = Some(content.into());
        self
    }

    /// Seeds the cache record of a guild.
    ///
    /// # Arguments
    /// - `guild_id` - Discord guild ID
    /// - `record` - JSON value to store as the guild's cache
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_guild_cache(mut self, guild_id: u64, record: Value) -> Self {
        self.guild_caches.push((guild_id, record));
        self
    }

    /// Writes an arbitrary file into the cache directory.
    pub fn with_cache_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.cache_files.push((name.into(), content.into()));
        self
    }

    /// Builds the test context and writes all configured fixture files.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context with temporary directories and fixtures in place
    /// - `Err(TestError)` - Failed to create directories or write fixtures
    pub fn build(self) -> Result<TestContext, TestError> {
        let context = TestContext::new()?;

        if let Some(config) = self.config {
            context.write_config(&config)?;
        }
        if let Some(raw) = self.raw_config {
            std::fs::write(context.config_dir().join("config.json"), raw)?;
        }
        for (guild_id, record) in self.guild_caches {
            context.write_guild_cache(guild_id, &record)?;
        }
        for (name, content) in self.cache_files {
            std::fs::write(context.cache_dir().join(name), content)?;
        }

        Ok(context)
    }
}
