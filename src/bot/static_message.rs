//! A message the bot keeps up to date in place.
//!
//! The message is either known by ID, or assumed to be the bot's latest message in
//! the channel; typically it is the only message in a locked channel. If neither
//! exists, the first update posts it.

use serenity::all::{
    ChannelId, CreateEmbed, CreateMessage, EditMessage, GetMessages, Http, MessageId, UserId,
};
use serenity::http::HttpError;

use crate::error::AppError;

/// Number of recent channel messages searched for the bot's message.
pub const SEARCH_LIMIT: u8 = 20;

/// Discord JSON error code for a message that does not exist.
const UNKNOWN_MESSAGE: isize = 10008;

#[derive(Debug, Clone)]
pub struct StaticMessage {
    channel_id: ChannelId,
    message_id: Option<MessageId>,
    /// Why locating the existing message failed, if it did.
    error: Option<String>,
}

impl StaticMessage {
    /// Finds the existing message in a channel.
    ///
    /// A given message ID that Discord reports as unknown falls back to searching the
    /// channel. Other failures are logged and remembered; the message then counts as
    /// not found and the next update posts a new one.
    ///
    /// # Arguments
    /// - `http` - Discord REST client
    /// - `channel_id` - Channel holding the message
    /// - `message_id` - ID of the message, if known
    /// - `bot_user_id` - The bot's user, author of the message
    pub async fn locate(
        http: &Http,
        channel_id: ChannelId,
        message_id: Option<MessageId>,
        bot_user_id: UserId,
    ) -> Self {
        match find_message(http, channel_id, message_id, bot_user_id).await {
            Ok(message_id) => Self {
                channel_id,
                message_id,
                error: None,
            },
            Err(e) => {
                tracing::warn!("Static message error in channel {}: {}", channel_id, e);
                Self {
                    channel_id,
                    message_id: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn message_id(&self) -> Option<MessageId> {
        self.message_id
    }

    /// Error that occurred while locating the message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Saves a new version of the message, posting it if it does not exist yet.
    ///
    /// # Returns
    /// - `Ok(MessageId)` - ID of the edited or posted message
    /// - `Err(AppError::DiscordErr)` - The message could not be edited or posted
    pub async fn update(
        &mut self,
        http: &Http,
        content: Option<String>,
        embeds: Vec<CreateEmbed>,
    ) -> Result<MessageId, AppError> {
        let message = match self.message_id {
            Some(message_id) => {
                let mut edit = EditMessage::new().embeds(embeds);
                if let Some(content) = content {
                    edit = edit.content(content);
                }
                http.edit_message(self.channel_id, message_id, &edit, vec![])
                    .await?
            }
            None => {
                let mut create = CreateMessage::new().embeds(embeds);
                if let Some(content) = content {
                    create = create.content(content);
                }
                self.channel_id.send_message(http, create).await?
            }
        };

        self.message_id = Some(message.id);
        Ok(message.id)
    }
}

async fn find_message(
    http: &Http,
    channel_id: ChannelId,
    message_id: Option<MessageId>,
    bot_user_id: UserId,
) -> Result<Option<MessageId>, serenity::Error> {
    if let Some(message_id) = message_id {
        match http.get_message(channel_id, message_id).await {
            Ok(message) => return Ok(Some(message.id)),
            Err(e) if is_unknown_message(&e) => {
                tracing::debug!("Message {} no longer exists", message_id);
            }
            Err(e) => return Err(e),
        }
    }

    let messages = channel_id
        .messages(http, GetMessages::new().limit(SEARCH_LIMIT))
        .await?;
    Ok(messages
        .into_iter()
        .filter(|message| message.author.id == bot_user_id)
        .max_by_key(|message| message.id)
        .map(|message| message.id))
}

fn is_unknown_message(error: &serenity::Error) -> bool {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            response.error.code == UNKNOWN_MESSAGE
                || response.error.message == "Unknown Message"
        }
        _ => false,
    }
}
