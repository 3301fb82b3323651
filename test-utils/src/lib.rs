//! HydraBot Test Utils
//!
//! Provides shared testing utilities for the bot's unit tests. This crate offers a
//! builder pattern for creating test contexts backed by temporary config and cache
//! directories, plus factories for configuration documents and Serenity objects.
//!
//! # Overview
//!
//! The test utilities consist of these components:
//! - **TestBuilder**: Fluent builder for configuring test environments
//! - **TestContext**: Test environment owning the temporary directories
//! - **TestError**: Error types that can occur during test setup
//! - **factory**: Builders for `config.json` documents and guild cache records
//! - **serenity**: Factories for Serenity model objects and Discord JSON payloads
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, factory};
//!
//! #[tokio::test]
//! async fn test_guild_cache() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_config(factory::config::create_config())
//!         .with_guild_cache(123, serde_json::json!({"commandHash": "abc"}))
//!         .build()?;
//!
//!     let cache_dir = test.cache_dir();
//!     // Exercise code reading from the cache directory...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
pub mod serenity;
