//! Factory methods for creating test data.
//!
//! This module provides factory methods for creating fixture documents with
//! sensible defaults, reducing boilerplate in tests.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! // Create with defaults
//! let config = factory::config::create_config();
//!
//! // Customize
//! let config = factory::config::ConfigFactory::new()
//!     .guild(111, 222)
//!     .guild(333, 444)
//!     .build();
//! ```
//!
//! # Available Factories
//!
//! - `config` - Create `config.json` documents
//! - `helpers` - Shared ID generation

pub mod config;
pub mod helpers;

pub use config::{create_config, ConfigFactory};
