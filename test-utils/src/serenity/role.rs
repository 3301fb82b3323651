//! Test factory for role JSON.

use serde_json::{json, Value};

/// Returns the JSON Discord sends for a role.
///
/// The bot only looks at role names (race and rank roles), so every other field
/// is set to a neutral default: no color, not hoisted, not managed, zero
/// permissions.
pub fn role_json(role_id: u64, name: &str) -> Value {
    json!({
        "id": role_id.to_string(),
        "name": name,
        "color": 0,
        "colors": {
            "primary_color": 0,
            "secondary_color": null,
            "tertiary_color": null,
        },
        "hoist": false,
        "icon": null,
        "unicode_emoji": null,
        "position": 1,
        "permissions": "0",
        "managed": false,
        "mentionable": false,
    })
}
