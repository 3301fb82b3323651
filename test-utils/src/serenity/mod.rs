//! Test factories for creating Serenity API objects.
//!
//! This module provides factory functions for creating mock Serenity structs
//! (Emoji, Message) for testing purposes, and the raw JSON Discord would
//! return for them. The typed factories deserialize that JSON, simulating what
//! Discord's API would return; the JSON factories are meant as mock HTTP response
//! bodies.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::serenity::{create_test_emoji, message_json, role_json};
//!
//! let rank = role_json(111111111, "S rank");
//! let zerg = create_test_emoji(222222222, "zerg");
//! let body = serde_json::json!([message_json(1, 2, 3, false, "[livestreams]")]);
//! ```
//!
//! # Available Factories
//!
//! - `role::role_json` - Roles
//! - `emoji::create_test_emoji` / `emoji::emoji_json` - Custom guild emoji
//! - `message::create_test_message` / `message::message_json` - Messages and attachments
//! - `member::member_json` - Guild members
//! - `user::user_json` - Users

pub mod emoji;
pub mod member;
pub mod message;
pub mod role;
pub mod user;

pub use emoji::{create_test_emoji, emoji_json};
pub use member::member_json;
pub use message::{attachment_json, create_test_message, message_json};
pub use role::role_json;
pub use user::user_json;
