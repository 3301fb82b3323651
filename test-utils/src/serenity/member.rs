//! Test factory for guild member JSON.

use serde_json::{json, Value};

use crate::serenity::user::user_json;

/// Returns the JSON Discord sends for a guild member.
///
/// Matches the response items of `GET /guilds/{id}/members/search`.
///
/// # Arguments
/// - `user_id` - Discord user ID (snowflake)
/// - `username` - Unique username
/// - `role_ids` - IDs of the roles the member has
pub fn member_json(user_id: u64, username: &str, role_ids: &[u64]) -> Value {
    json!({
        "user": user_json(user_id, username, false),
        "nick": null,
        "roles": role_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
        "joined_at": "2020-01-01T00:00:00.000000+00:00",
        "deaf": false,
        "mute": false,
        "flags": 0,
    })
}
