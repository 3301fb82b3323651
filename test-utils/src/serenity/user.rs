//! Test factory for Discord user JSON.

use serde_json::{json, Value};

/// Returns the JSON Discord sends for a user.
///
/// # Arguments
/// - `user_id` - Discord user ID (snowflake)
/// - `username` - Unique username
/// - `bot` - Whether the account is a bot
pub fn user_json(user_id: u64, username: &str, bot: bool) -> Value {
    json!({
        "id": user_id.to_string(),
        "username": username,
        "discriminator": "0",
        "global_name": null,
        "avatar": null,
        "bot": bot,
    })
}
