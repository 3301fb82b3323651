//! The livestreams list embed.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serenity::all::{CreateEmbed, CreateEmbedAuthor};

use crate::{
    service::{remote::EmojiDecorator, remote::MemberMeta, twitch::StreamInfo},
    util::{
        format::{format_dynamic_timestamp, format_user_reference, plural, TimestampStyle},
        roles::RoleMeta,
        settings::StreamerEntry,
    },
};

pub const TWITCH_COLOR: u32 = 0x6441a5;
const TWITCH_LOGO: &str = "https://i.imgur.com/2JHEBZk.png";

/// Game name of streams listed as "Currently live".
pub const STARCRAFT_GAME: &str = "StarCraft";

/// Shown in place of an empty section.
const EMPTY_SECTION: &str = "None. :harold:";

/// Maximum length of an embed description, in characters.
const DESCRIPTION_LIMIT: usize = 4096;

/// Everything known about one listed streamer.
#[derive(Debug, Clone)]
pub struct StreamerStatus {
    pub entry: StreamerEntry,
    /// The matching guild member, if one was found.
    pub member: Option<MemberMeta>,
    /// Current stream, `None` while offline.
    pub stream: Option<StreamInfo>,
    pub last_live: Option<DateTime<Utc>>,
}

impl StreamerStatus {
    fn roles(&self) -> RoleMeta {
        self.member.map(|member| member.roles).unwrap_or_default()
    }
}

/// Orders streamers live first, then by rank, race and name.
pub fn sort_streamers(streamers: &mut [StreamerStatus]) {
    streamers.sort_by_key(|status| {
        let roles = status.roles();
        (
            Reverse(status.stream.is_some()),
            roles.rank_order(),
            roles.race_order(),
            status.entry.username.to_lowercase(),
        )
    });
}

/// Builds the embed listing all streamers of a guild.
///
/// Expects the streamers to be sorted already. Emoji tokens are decorated with
/// the guild's emoji.
pub fn build_embed(
    streamers: &[StreamerStatus],
    decorator: &EmojiDecorator,
    now: DateTime<Utc>,
) -> CreateEmbed {
    let mut starcraft = Vec::new();
    let mut other = Vec::new();
    let mut offline = Vec::new();
    for status in streamers {
        match &status.stream {
            Some(stream) if stream.game_name == STARCRAFT_GAME => {
                starcraft.push(live_item(status, stream, false))
            }
            Some(stream) => other.push(live_item(status, stream, true)),
            None => offline.push(offline_item(status)),
        }
    }

    let mut sections = vec![("Currently live", starcraft)];
    if !other.is_empty() {
        sections.push(("Playing something else", other));
    }
    sections.push(("Offline", offline));

    let header = format!(
        "Last updated {}.",
        format_dynamic_timestamp(now, TimestampStyle::ShortTime)
    );

    CreateEmbed::new()
        .color(TWITCH_COLOR)
        .author(CreateEmbedAuthor::new("Twitch streams").icon_url(TWITCH_LOGO))
        .description(describe(header, sections, decorator))
}

/// A piece of the description; `item` marks pieces listing a streamer.
struct Chunk {
    text: String,
    item: bool,
}

/// Joins the decorated sections under their headings.
///
/// Once the description would exceed `DESCRIPTION_LIMIT`, the remaining streamers
/// are left out and counted in a closing "*and N more.*" line.
fn describe(
    header: String,
    sections: Vec<(&str, Vec<String>)>,
    decorator: &EmojiDecorator,
) -> String {
    let mut chunks = Vec::new();
    for (heading, items) in sections {
        chunks.push(Chunk {
            text: format!("\n\n### {}\n", heading),
            item: false,
        });
        if items.is_empty() {
            chunks.push(Chunk {
                text: decorator.decorate(EMPTY_SECTION),
                item: false,
            });
        }
        for (index, item) in items.iter().enumerate() {
            let separator = if index == 0 { "" } else { "\n" };
            chunks.push(Chunk {
                text: format!("{}{}", separator, decorator.decorate(item)),
                item: true,
            });
        }
    }

    let full_length = header.chars().count()
        + chunks
            .iter()
            .map(|chunk| chunk.text.chars().count())
            .sum::<usize>();
    let items = chunks.iter().filter(|chunk| chunk.item).count();
    let reserve = if full_length > DESCRIPTION_LIMIT {
        more_line(items).chars().count()
    } else {
        0
    };

    let mut description = header;
    let mut length = description.chars().count();
    for (index, chunk) in chunks.iter().enumerate() {
        let chunk_length = chunk.text.chars().count();
        if length + chunk_length + reserve > DESCRIPTION_LIMIT {
            let hidden = chunks[index..].iter().filter(|chunk| chunk.item).count();
            if hidden > 0 {
                description.push_str(&more_line(hidden));
            }
            break;
        }
        description.push_str(&chunk.text);
        length += chunk_length;
    }

    description
}

fn more_line(hidden: usize) -> String {
    format!("\n*and {} more.*", hidden)
}

/// Rank and race emoji followed by a mention, or the plain name for non-members.
fn who(status: &StreamerStatus) -> String {
    let roles = status.roles();
    let mut prefix = String::new();
    if let Some(rank) = roles.rank {
        prefix.push_str(&format!(":rank{}: ", rank.letter()));
    }
    if let Some(race) = roles.race {
        prefix.push_str(&format!(":{}: ", race.emoji_name()));
    }

    match status.member {
        Some(member) => format!("{}{}", prefix, format_user_reference(member.user_id.get())),
        None => format!("{}{}", prefix, status.entry.username),
    }
}

fn channel_link(entry: &StreamerEntry) -> String {
    format!("[twitch.tv/{}]({})", entry.twitch_username, entry.twitch_url)
}

fn live_item(status: &StreamerStatus, stream: &StreamInfo, show_game: bool) -> String {
    let title = if stream.title.trim().is_empty() {
        "Untitled stream".to_string()
    } else {
        stream.title.replace(['[', ']'], "")
    };
    let game = if show_game && !stream.game_name.is_empty() {
        format!("{}, ", stream.game_name)
    } else {
        String::new()
    };

    format!(
        "* {} - [{}]({}) / {}\n  {}{} {}, started {}",
        who(status),
        title,
        status.entry.twitch_url,
        channel_link(&status.entry),
        game,
        stream.viewer_count,
        plural(stream.viewer_count as usize, "viewer"),
        format_dynamic_timestamp(stream.started_at, TimestampStyle::Relative)
    )
}

fn offline_item(status: &StreamerStatus) -> String {
    let mut item = format!("* {} - {}", who(status), channel_link(&status.entry));
    if let Some(last_live) = status.last_live {
        item.push_str(&format!(
            ", last live {}",
            format_dynamic_timestamp(last_live, TimestampStyle::Relative)
        ));
    }
    item
}
