//! Data the bot reads from the guilds themselves.
//!
//! This covers the settings posted in a guild's settings channel, the guild's custom
//! emoji (used to decorate messages) and the race and rank roles of members.

use std::collections::HashMap;

use serenity::all::{ChannelId, Emoji, GetMessages, GuildId, Http, Member, Message, UserId};

use crate::{
    error::AppError,
    util::{
        format::unwrap_code_block,
        roles::RoleMeta,
        settings::{parse_settings, RemoteSettings},
    },
};

/// Number of recent messages read from the settings channel.
pub const SETTINGS_MESSAGE_LIMIT: u8 = 20;

/// Internal emoji names and the guild emoji names they map to by default.
///
/// Guilds can override entries through `emojiMapping` in the config.
const DEFAULT_EMOJI_MAPPING: &[(&str, &str)] = &[
    ("terran", "terran"),
    ("protoss", "protoss"),
    ("zerg", "zerg"),
    ("random", "random"),
    ("racepick_random", "random"),
    ("racepicker", "racepicker"),
    ("ranks", "ranks"),
    ("ranka", "ranka"),
    ("rankb", "rankb"),
    ("rankc", "rankc"),
    ("rankd", "rankd"),
    ("ranke", "ranke"),
    ("rankf", "rankf"),
    ("ranku", "ranku"),
];

/// Replaces `:name:` tokens with a guild's custom emoji.
///
/// Tokens naming an internal emoji (see the emoji mapping) are replaced first, so
/// `:zerg:` becomes the guild's mapped zerg emoji even if the guild also has an
/// unrelated emoji literally called `zerg`. Remaining tokens are matched against
/// all other guild emoji by name.
#[derive(Debug, Clone, Default)]
pub struct EmojiDecorator {
    /// Internal name to formatted emoji.
    known: HashMap<String, String>,
    /// Guild emoji name to formatted emoji.
    other: HashMap<String, String>,
}

impl EmojiDecorator {
    /// Builds a decorator from a guild's emoji list.
    ///
    /// # Arguments
    /// - `emojis` - The guild's custom emoji
    /// - `overrides` - Guild specific mapping from internal name to guild emoji name
    ///   (first element of each list)
    pub fn new(emojis: &[Emoji], overrides: &HashMap<String, Vec<String>>) -> Self {
        let mut mapping: HashMap<String, String> = DEFAULT_EMOJI_MAPPING
            .iter()
            .map(|(internal, guild)| (internal.to_string(), guild.to_string()))
            .collect();
        for (internal, names) in overrides {
            if let Some(name) = names.first() {
                mapping.insert(internal.clone(), name.clone());
            }
        }

        let mut known = HashMap::new();
        let mut other = HashMap::new();
        for emoji in emojis {
            let formatted = emoji.to_string();
            let mut mapped = false;
            for (internal, guild_name) in &mapping {
                if *guild_name == emoji.name {
                    known.insert(internal.clone(), formatted.clone());
                    mapped = true;
                }
            }
            if !mapped {
                other.insert(emoji.name.clone(), formatted);
            }
        }

        Self { known, other }
    }

    /// Replaces all emoji tokens in a string.
    ///
    /// The input is scanned once; replaced emoji are never matched again.
    pub fn decorate(&self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find(':') {
            output.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let replacement = after
                .find(':')
                .map(|end| &after[..end])
                .filter(|name| is_emoji_name(name))
                .and_then(|name| Some((name, self.lookup(name)?)));

            match replacement {
                Some((name, formatted)) => {
                    output.push_str(formatted);
                    rest = &after[name.len() + 1..];
                }
                None => {
                    output.push(':');
                    rest = after;
                }
            }
        }
        output.push_str(rest);

        output
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.known
            .get(name)
            .or_else(|| self.other.get(name))
            .map(String::as_str)
    }
}

fn is_emoji_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Fetches a guild's emoji and builds a decorator from them.
pub async fn fetch_emoji_decorator(
    http: &Http,
    guild_id: GuildId,
    overrides: &HashMap<String, Vec<String>>,
) -> Result<EmojiDecorator, AppError> {
    let emojis = guild_id.emojis(http).await?;
    Ok(EmojiDecorator::new(&emojis, overrides))
}

/// Reads the bot's settings from a guild's settings channel.
///
/// The last messages of the channel are combined oldest first, with code block
/// fences removed, and parsed as one INI document.
///
/// # Arguments
/// - `http` - Discord REST client
/// - `channel_id` - Settings channel
///
/// # Returns
/// - `Ok(RemoteSettings)` - Parsed settings, defaults for anything missing
/// - `Err(AppError::DiscordErr)` - The channel's messages could not be fetched
pub async fn fetch_remote_settings(
    http: &Http,
    channel_id: ChannelId,
) -> Result<RemoteSettings, AppError> {
    let messages = channel_id
        .messages(http, GetMessages::new().limit(SETTINGS_MESSAGE_LIMIT))
        .await?;
    Ok(parse_settings(&combine_settings_messages(messages)))
}

/// Joins settings messages oldest first into a single document.
fn combine_settings_messages(mut messages: Vec<Message>) -> String {
    messages.sort_by_key(|message| message.id);
    messages
        .iter()
        .flat_map(|message| {
            unwrap_code_block(&message.content)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Discord identity and role metadata of a streamer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberMeta {
    pub user_id: UserId,
    pub roles: RoleMeta,
}

/// Splits a `name#1234` style username into name and discriminator.
pub fn split_username(username: &str) -> (&str, Option<&str>) {
    match username.split_once('#') {
        Some((name, discriminator)) => (name, Some(discriminator)),
        None => (username, None),
    }
}

/// Looks up guild members by username and detects their race and rank roles.
///
/// Users that cannot be found in the guild are left out of the result.
///
/// # Arguments
/// - `http` - Discord REST client
/// - `guild_id` - Guild to search
/// - `usernames` - Usernames, optionally with a legacy `#discriminator`
///
/// # Returns
/// - `Ok(HashMap)` - Metadata keyed by the username as given
/// - `Err(AppError::DiscordErr)` - The guild's roles could not be fetched
pub async fn fetch_user_role_meta(
    http: &Http,
    guild_id: GuildId,
    usernames: &[String],
) -> Result<HashMap<String, MemberMeta>, AppError> {
    let roles = guild_id.roles(http).await?;
    let mut result = HashMap::new();

    for username in usernames {
        let (name, discriminator) = split_username(username);
        let members = match guild_id.search_members(http, name, Some(10)).await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!("Failed to search guild {} for {}: {}", guild_id, name, e);
                continue;
            }
        };

        let candidates: Vec<Member> = members
            .into_iter()
            .filter(|member| match discriminator {
                Some(discriminator) => member
                    .user
                    .discriminator
                    .is_some_and(|d| d.to_string() == discriminator.trim_start_matches('0')),
                None => true,
            })
            .collect();
        // Search matches prefixes, so prefer an exact name match.
        let found = candidates
            .iter()
            .find(|member| is_named(member, name))
            .or_else(|| candidates.first());
        let Some(member) = found else {
            tracing::debug!("User {} not found in guild {}", username, guild_id);
            continue;
        };

        let role_names = member
            .roles
            .iter()
            .filter_map(|role_id| roles.get(role_id))
            .map(|role| role.name.as_str());

        result.insert(
            username.clone(),
            MemberMeta {
                user_id: member.user.id,
                roles: RoleMeta::from_role_names(role_names),
            },
        );
    }

    Ok(result)
}

fn is_named(member: &Member, name: &str) -> bool {
    member.user.name.eq_ignore_ascii_case(name)
        || member
            .user
            .global_name
            .as_deref()
            .is_some_and(|global| global.eq_ignore_ascii_case(name))
        || member
            .nick
            .as_deref()
            .is_some_and(|nick| nick.eq_ignore_ascii_case(name))
}
