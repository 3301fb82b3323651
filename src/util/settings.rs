//! Remote settings posted as INI text in a guild's settings channel.
//!
//! Moderators configure parts of the bot from Discord itself by posting (or editing)
//! messages like this in the settings channel:
//!
//! ```ini
//! [livestreams]
//! channelId = 123456789012345678
//! description = Community streams
//! users[] = Flash <https://twitch.tv/flash>
//! users[] = Jaedong <https://www.twitch.tv/jaedong>
//! ```
//!
//! Unknown sections and keys are ignored, and malformed user lines are dropped.

use std::collections::HashMap;

use serenity::all::ChannelId;

/// Settings read from the settings channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSettings {
    pub livestreams: LivestreamSettings,
}

/// Settings of the livestreams list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LivestreamSettings {
    /// Channel holding the livestreams static message.
    pub channel_id: Option<ChannelId>,
    /// Text shown above the list.
    pub description: String,
    pub users: Vec<StreamerEntry>,
}

/// A community member with a Twitch channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamerEntry {
    /// Display name, also used to look up the Discord member.
    pub username: String,
    pub twitch_url: String,
    /// Twitch login, taken from the last path segment of the URL.
    pub twitch_username: String,
}

impl StreamerEntry {
    /// Parses a line of the form `Name <https://twitch.tv/login>`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let inner = line.strip_suffix('>')?;
        let (name, url) = inner.split_once('<')?;
        let username = name.trim();
        let url = url.trim();
        if username.is_empty() || url.is_empty() {
            return None;
        }

        let (_, login) = url.split_once("twitch.tv/")?;
        let login = login.trim();
        if login.is_empty() {
            return None;
        }

        Some(StreamerEntry {
            username: username.to_string(),
            twitch_url: url.to_string(),
            twitch_username: login.to_string(),
        })
    }
}

/// Parsed INI document: section name to key to values.
///
/// Plain keys keep their last value; `key[]` keys accumulate.
type IniSections = HashMap<String, HashMap<String, Vec<String>>>;

fn parse_ini(content: &str) -> IniSections {
    let mut sections: IniSections = HashMap::new();
    let mut current = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            current = section.trim().to_string();
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = unquote(value.trim()).to_string();
        let entries = sections.entry(current.clone()).or_default();

        match key.strip_suffix("[]") {
            Some(array_key) => entries
                .entry(array_key.trim().to_string())
                .or_default()
                .push(value),
            None => {
                entries.insert(key.to_string(), vec![value]);
            }
        }
    }

    sections
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Extracts the bot settings from the combined settings channel text.
///
/// Missing values fall back to an empty description, no channel and no users.
pub fn parse_settings(content: &str) -> RemoteSettings {
    let sections = parse_ini(content);
    let Some(livestreams) = sections.get("livestreams") else {
        return RemoteSettings::default();
    };

    let single = |key: &str| livestreams.get(key).and_then(|values| values.last());

    RemoteSettings {
        livestreams: LivestreamSettings {
            channel_id: single("channelId")
                .and_then(|id| id.parse::<u64>().ok())
                .filter(|id| *id != 0)
                .map(ChannelId::new),
            description: single("description").cloned().unwrap_or_default(),
            users: livestreams
                .get("users")
                .map(|lines| lines.iter().filter_map(|line| StreamerEntry::parse(line)).collect())
                .unwrap_or_default(),
        },
    }
}
