//! Test factory for creating Serenity Emoji objects.

use serde_json::{json, Value};
use serenity::all::Emoji;

/// Returns the JSON Discord sends for a static custom emoji.
///
/// Useful as a mock HTTP response body for `GET /guilds/{id}/emojis`.
pub fn emoji_json(emoji_id: u64, name: &str) -> Value {
    json!({
        "id": emoji_id.to_string(),
        "name": name,
        "animated": false,
        "available": true,
        "managed": false,
        "require_colons": true,
        "roles": [],
    })
}

/// Creates a test custom guild emoji.
///
/// # Arguments
/// - `emoji_id` - Discord emoji ID (snowflake)
/// - `name` - Emoji name as configured in the guild
///
/// # Returns
/// - `Emoji` - A valid, static (non-animated) Serenity Emoji
///
/// # Panics
/// - If the JSON cannot be deserialized into an Emoji (indicates invalid test data)
pub fn create_test_emoji(emoji_id: u64, name: &str) -> Emoji {
    serde_json::from_value(emoji_json(emoji_id, name))
        .expect("Failed to create test emoji - invalid JSON structure")
}
