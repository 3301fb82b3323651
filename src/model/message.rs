use serenity::all::{Attachment, ChannelId, GuildId, Message, MessageId, UserId};

/// File attached to an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingAttachment {
    pub name: String,
    /// CDN URL the file can be downloaded from.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type as reported by Discord, if any.
    pub content_type: Option<String>,
}

impl From<&Attachment> for IncomingAttachment {
    fn from(attachment: &Attachment) -> Self {
        Self {
            name: attachment.filename.clone(),
            url: attachment.url.clone(),
            size: u64::from(attachment.size),
            content_type: attachment.content_type.clone(),
        }
    }
}

/// A message posted in a channel the bot can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    /// `None` for direct messages.
    pub guild_id: Option<GuildId>,
    pub author_id: UserId,
    /// Whether the author is a bot account.
    pub author_is_bot: bool,
    pub content: String,
    pub attachments: Vec<IncomingAttachment>,
}

impl From<&Message> for IncomingMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
            guild_id: message.guild_id,
            author_id: message.author.id,
            author_is_bot: message.author.bot,
            content: message.content.clone(),
            attachments: message.attachments.iter().map(IncomingAttachment::from).collect(),
        }
    }
}
