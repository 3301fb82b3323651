//! Test factory for creating Serenity Message objects.

use serde_json::{json, Value};
use serenity::all::Message;

use crate::serenity::user::user_json;

/// Returns the JSON Discord sends for a plain text message.
///
/// # Arguments
/// - `message_id` - Message ID; Discord snowflakes sort by creation time
/// - `channel_id` - Channel the message was posted in
/// - `author_id` - ID of the author
/// - `author_bot` - Whether the author is a bot account
/// - `content` - Message text
pub fn message_json(
    message_id: u64,
    channel_id: u64,
    author_id: u64,
    author_bot: bool,
    content: &str,
) -> Value {
    json!({
        "id": message_id.to_string(),
        "channel_id": channel_id.to_string(),
        "author": user_json(author_id, &format!("user{}", author_id), author_bot),
        "content": content,
        "timestamp": "2024-03-01T12:00:00.000000+00:00",
        "edited_timestamp": null,
        "tts": false,
        "mention_everyone": false,
        "mentions": [],
        "mention_roles": [],
        "attachments": [],
        "embeds": [],
        "pinned": false,
        "type": 0,
    })
}

/// Returns the JSON Discord sends for a message attachment.
///
/// # Arguments
/// - `attachment_id` - Attachment ID
/// - `filename` - File name, e.g. `"game.rep"`
/// - `size` - Size in bytes
/// - `url` - Download URL
/// - `content_type` - MIME type, if Discord detected one
pub fn attachment_json(
    attachment_id: u64,
    filename: &str,
    size: u32,
    url: &str,
    content_type: Option<&str>,
) -> Value {
    json!({
        "id": attachment_id.to_string(),
        "filename": filename,
        "size": size,
        "url": url,
        "proxy_url": url,
        "content_type": content_type,
    })
}

/// Creates a test Serenity Message.
///
/// # Arguments
/// - `message_id` - Message ID
/// - `channel_id` - Channel the message was posted in
/// - `author_id` - ID of the author
/// - `author_bot` - Whether the author is a bot account
/// - `content` - Message text
/// - `attachments` - Attachment JSON values from [`attachment_json`]
///
/// # Panics
/// - If the JSON cannot be deserialized into a Message (indicates invalid test data)
pub fn create_test_message(
    message_id: u64,
    channel_id: u64,
    author_id: u64,
    author_bot: bool,
    content: &str,
    attachments: Vec<Value>,
) -> Message {
    let mut value = message_json(message_id, channel_id, author_id, author_bot, content);
    value["attachments"] = Value::Array(attachments);
    serde_json::from_value(value).expect("Failed to create test message - invalid JSON structure")
}
