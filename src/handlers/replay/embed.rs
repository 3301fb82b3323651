//! Reply content for posted replay files.

use chrono::Utc;
use serenity::all::{CreateEmbed, CreateEmbedAuthor, Timestamp};

use crate::{
    error::replay::ReplayError,
    model::message::IncomingAttachment,
    service::{
        map_image::MapImage,
        remote::EmojiDecorator,
        replay::{ChatLine, ReplaySummary},
    },
    util::format::{
        format_dynamic_timestamp, format_filesize, format_game_duration, plural,
        wrap_code_block, TimestampStyle,
    },
};

pub const BATTLE_NET_COLOR: u32 = 0x0074e0;
const BATTLE_NET_LOGO: &str = "https://i.imgur.com/C8izhrY.png";

/// Discord's limit for the value of an embed field.
const FIELD_VALUE_LIMIT: usize = 1024;

/// A replay attachment after downloading and parsing.
#[derive(Debug, Clone)]
pub struct ProcessedReplay {
    pub attachment: IncomingAttachment,
    pub result: Result<ReplaySummary, ReplayError>,
    pub image: Option<MapImage>,
}

/// The reply to a message with replay attachments.
#[derive(Debug, Clone, Default)]
pub struct ReplayReply {
    /// One line per replay that could not be parsed.
    pub content: Option<String>,
    pub embeds: Vec<CreateEmbed>,
    pub files: Vec<MapImage>,
}

/// Builds the reply for all replays posted in one message.
///
/// Parsed replays get an embed each, failures a line of text. When more than one
/// replay was posted, a summary embed with the number of replays and their total
/// length is added; only parsed replays count toward the length.
pub fn build_reply(replays: &[ProcessedReplay], decorator: &EmojiDecorator) -> ReplayReply {
    let mut lines = Vec::new();
    let mut reply = ReplayReply::default();
    let mut total_ms = 0;

    for replay in replays {
        if let Some(image) = &replay.image {
            reply.files.push(image.clone());
        }
        match &replay.result {
            Ok(summary) => {
                total_ms += summary.duration_ms;
                reply.embeds.push(replay_embed(
                    summary,
                    &replay.attachment,
                    replay.image.as_ref(),
                    decorator,
                ));
            }
            Err(e) => lines.push(error_line(&replay.attachment, e)),
        }
    }

    if replays.len() > 1 {
        reply.embeds.push(summary_embed(replays.len(), total_ms));
    }
    if !lines.is_empty() {
        reply.content = Some(lines.join("\n"));
    }

    reply
}

/// Explains why a replay could not be parsed.
pub fn error_line(attachment: &IncomingAttachment, error: &ReplayError) -> String {
    let base = format!(
        "Could not parse the replay file `{}` ({}):",
        attachment.name,
        format_filesize(attachment.size)
    );

    match error {
        ReplayError::UnsupportedVersion(_) => {
            format!("{} only *StarCraft: Remastered* replay files are supported.", base)
        }
        ReplayError::Unknown(message) => format!(
            "{} unknown what went wrong. Here's the error:\n{}",
            base,
            wrap_code_block(message, "")
        ),
    }
}

pub fn summary_embed(count: usize, total_ms: u64) -> CreateEmbed {
    CreateEmbed::new().color(BATTLE_NET_COLOR).description(format!(
        "**Summary:** {} {} for a total length of {}.",
        count,
        plural(count, "replay"),
        format_game_duration(total_ms)
    ))
}

fn replay_embed(
    summary: &ReplaySummary,
    attachment: &IncomingAttachment,
    image: Option<&MapImage>,
    decorator: &EmojiDecorator,
) -> CreateEmbed {
    let title = if summary.title.trim().is_empty() {
        summary.matchup()
    } else {
        summary.title.clone()
    };

    let players = summary
        .players
        .iter()
        .filter(|player| !player.is_observer)
        .map(|player| format!("• {}{}", race_emoji(&player.race), player.name))
        .collect::<Vec<_>>()
        .join("\n");

    let played = match summary.start_time {
        Some(start) => format!(
            "📅 {} {}, {}",
            start.format("%Y-%m-%d"),
            format_dynamic_timestamp(start, TimestampStyle::ShortTime),
            format_dynamic_timestamp(start, TimestampStyle::Relative)
        ),
        None => "Unknown".to_string(),
    };

    let mut embed = CreateEmbed::new()
        .color(BATTLE_NET_COLOR)
        .author(CreateEmbedAuthor::new("Replay file information").icon_url(BATTLE_NET_LOGO))
        .url(&attachment.url)
        .timestamp(Timestamp::from(Utc::now()))
        .title(decorator.decorate(&title))
        .field("Players", decorator.decorate(&players), false)
        .field("Map", format!("🗺️ {}", summary.map_name), true)
        .field("Length", format_game_duration(summary.duration_ms), true)
        .field("Played", played, false)
        .field(
            "Download",
            format!(
                "📁 [{} ({})]({})",
                attachment.name,
                format_filesize(attachment.size),
                attachment.url
            ),
            false,
        )
        .field("Chat messages (click to reveal)", chat_field(&summary.chat), false);

    if let Some(image) = image {
        embed = embed.thumbnail(format!("attachment://{}", image.filename));
    }

    embed
}

/// Emoji token for a race, decorated into the guild's emoji later.
fn race_emoji(race: &str) -> String {
    match race.to_lowercase().as_str() {
        race @ ("terran" | "protoss" | "zerg") => format!(":{}: ", race),
        _ => "❔ ".to_string(),
    }
}

/// Lists chat lines behind spoiler tags, cut off at the field length limit.
fn chat_field(chat: &[ChatLine]) -> String {
    if chat.is_empty() {
        return "*No messages.*".to_string();
    }

    let mut value = String::new();
    for (n, line) in chat.iter().enumerate() {
        let formatted = format!(
            "||`{}` **{}**: {}||",
            format_game_duration(line.time_ms),
            line.player,
            line.message.replace('|', "")
        );
        let more = format!("\n*and {} more.*", chat.len() - n);
        if value.len() + formatted.len() + 1 + more.len() > FIELD_VALUE_LIMIT {
            value.push_str(&more);
            break;
        }
        if !value.is_empty() {
            value.push('\n');
        }
        value.push_str(&formatted);
    }

    value
}
