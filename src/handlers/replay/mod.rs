//! Shows information about StarCraft replay files posted in a channel.
//!
//! Every `.rep` attachment of a message is downloaded and run through the
//! configured replay parser; the bot then replies with one embed per replay, a
//! line of text for each replay that could not be parsed and, for several
//! replays, their combined length. The handler only loads its work when a
//! replay parser is configured.

pub mod embed;

use serenity::all::{CreateAllowedMentions, CreateAttachment, CreateMessage};
use serenity::async_trait;

use crate::{
    error::{replay::ReplayError, AppError},
    model::message::{IncomingAttachment, IncomingMessage},
    module::{Manifest, MessageHandler, ModuleContext},
    service::{
        map_image::{MapImage, MapRenderer},
        remote::{fetch_emoji_decorator, EmojiDecorator},
        replay::ReplayParser,
    },
    util::format::plural,
};

use embed::{build_reply, ProcessedReplay, ReplayReply};

/// MIME type Discord reports for `.rep` files.
pub const REPLAY_CONTENT_TYPE: &str = "application/vnd.businessobjects";

pub struct ReplayHandler;

#[async_trait]
impl MessageHandler for ReplayHandler {
    fn manifest(&self) -> Option<Manifest> {
        Some(Manifest::new(
            "replay",
            "Displays information about replay file attachments in messages.",
        ))
    }

    async fn applies(
        &self,
        message: &IncomingMessage,
        ctx: &ModuleContext,
    ) -> Result<bool, AppError> {
        Ok(ctx.state.services.replay_parser.is_some()
            && message.attachments.iter().any(is_replay_file))
    }

    async fn handle(&self, message: &IncomingMessage, ctx: &ModuleContext) -> Result<(), AppError> {
        let Some(parser) = ctx.state.services.replay_parser.clone() else {
            return Ok(());
        };
        let renderer = ctx.state.services.map_renderer.clone();

        let decorator = guild_decorator(message, ctx).await;

        let mut replays = Vec::new();
        for attachment in message.attachments.iter().filter(|a| is_replay_file(a)) {
            replays.push(
                process_replay(
                    attachment,
                    &ctx.state.services.http_client,
                    &*parser,
                    renderer.as_deref(),
                )
                .await,
            );
        }

        let reply = build_reply(&replays, &decorator);
        send_reply(message, reply, ctx).await?;

        tracing::info!(
            "Parsed {} replay {}",
            replays.len(),
            plural(replays.len(), "file")
        );

        Ok(())
    }
}

/// Returns whether an attachment looks like a StarCraft replay.
pub fn is_replay_file(attachment: &IncomingAttachment) -> bool {
    attachment.name.to_lowercase().ends_with(".rep")
        && attachment
            .content_type
            .as_deref()
            .map_or(true, |content_type| content_type == REPLAY_CONTENT_TYPE)
}

/// Builds the emoji decorator of the message's guild.
///
/// Falls back to a decorator that leaves tokens in place outside of configured
/// guilds or when the guild's emoji cannot be fetched.
async fn guild_decorator(message: &IncomingMessage, ctx: &ModuleContext) -> EmojiDecorator {
    let Some(guild_id) = message.guild_id else {
        return EmojiDecorator::default();
    };
    let Some(guild) = ctx.state.config.guild(guild_id) else {
        return EmojiDecorator::default();
    };

    match fetch_emoji_decorator(&ctx.http, guild_id, &guild.emoji_mapping).await {
        Ok(decorator) => decorator,
        Err(e) => {
            tracing::warn!("Could not fetch emoji of guild {}: {}", guild_id, e);
            EmojiDecorator::default()
        }
    }
}

/// Downloads, renders and parses a single replay.
///
/// Download failures are reported like parser failures. A map image that cannot
/// be rendered is left out.
pub async fn process_replay(
    attachment: &IncomingAttachment,
    http_client: &reqwest::Client,
    parser: &dyn ReplayParser,
    renderer: Option<&dyn MapRenderer>,
) -> ProcessedReplay {
    let bytes = match download(http_client, &attachment.url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return ProcessedReplay {
                attachment: attachment.clone(),
                result: Err(ReplayError::Unknown(e.to_string())),
                image: None,
            }
        }
    };

    let image = match renderer {
        Some(renderer) => render_map(renderer, attachment, &bytes).await,
        None => None,
    };

    ProcessedReplay {
        attachment: attachment.clone(),
        result: parser.parse(&bytes).await,
        image,
    }
}

async fn download(http_client: &reqwest::Client, url: &str) -> Result<Vec<u8>, AppError> {
    let response = http_client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

async fn render_map(
    renderer: &dyn MapRenderer,
    attachment: &IncomingAttachment,
    bytes: &[u8],
) -> Option<MapImage> {
    match renderer.render(bytes).await {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::warn!("Could not create map image for {}: {}", attachment.url, e);
            None
        }
    }
}

/// Replies to the message without pinging its author.
async fn send_reply(
    message: &IncomingMessage,
    reply: ReplayReply,
    ctx: &ModuleContext,
) -> Result<(), AppError> {
    let mut builder = CreateMessage::new()
        .embeds(reply.embeds)
        .reference_message((message.channel_id, message.id))
        .allowed_mentions(CreateAllowedMentions::new().replied_user(false));
    if let Some(content) = reply.content {
        builder = builder.content(content);
    }
    for image in reply.files {
        builder = builder.add_file(CreateAttachment::bytes(image.bytes, image.filename));
    }

    message.channel_id.send_message(&ctx.http, builder).await?;
    Ok(())
}
