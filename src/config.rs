//! Process configuration loaded from `config.json`.
//!
//! The configuration is read once during startup and shared read-only afterwards.
//! Required fields are never defaulted: a missing credential or guild list is a
//! parse error that stops the bot before it connects.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serenity::all::{ChannelId, GuildId};

use crate::{data::ensure_dir, error::config::ConfigError};

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub discord: DiscordConfig,
    pub twitch: TwitchConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordConfig {
    pub credentials: DiscordCredentials,
    pub guilds: Vec<GuildConfig>,
    /// Channel that receives a mirror of the bot's log output once connected.
    #[serde(default)]
    pub log_channel_id: Option<ChannelId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordCredentials {
    pub client_id: String,
    pub bot_token: String,
}

/// Per-guild configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuildConfig {
    pub id: GuildId,
    pub channel_ids: GuildChannelIds,
    /// Overrides of the default emoji mapping; internal name to the guild's emoji
    /// name (first element).
    #[serde(default)]
    pub emoji_mapping: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuildChannelIds {
    /// Channel whose messages hold the bot's remote settings.
    pub settings: ChannelId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitchConfig {
    pub app_credentials: TwitchAppCredentials,
    pub api_credentials: TwitchApiCredentials,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitchAppCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitchApiCredentials {
    /// One-time authorization code, only used while no token is cached.
    pub auth_code: String,
    pub user_name: String,
}

/// External tools used by the replay handler. Both are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayConfig {
    #[serde(default)]
    pub parser_command: Option<Vec<String>>,
    #[serde(default)]
    pub map_image_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Include the date, not only the time, in log line timestamps.
    #[serde(default)]
    pub include_dates: bool,
}

impl Config {
    /// Reads and parses `config.json` from the config directory.
    ///
    /// The directory itself is created if it does not exist yet, so that a first
    /// run leaves behind the place where the file is expected.
    ///
    /// # Arguments
    /// - `dir` - Config directory
    ///
    /// # Returns
    /// - `Ok(Config)` - Parsed configuration
    /// - `Err(ConfigError::Missing)` - No `config.json` in the directory
    /// - `Err(ConfigError::Parse)` - Invalid JSON or missing required field
    /// - `Err(ConfigError::Io)` - Any other filesystem failure
    pub async fn read(dir: &Path) -> Result<Self, ConfigError> {
        ensure_dir(dir).await.map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(CONFIG_FILE_NAME);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing { path });
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        Self::parse(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parses configuration JSON.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Returns the configuration of a guild, if the guild is configured.
    pub fn guild(&self, guild_id: GuildId) -> Option<&GuildConfig> {
        self.discord.guilds.iter().find(|guild| guild.id == guild_id)
    }
}

/// Filesystem locations used by the bot.
#[derive(Debug, Clone)]
pub struct Paths {
    pub config: PathBuf,
    pub cache: PathBuf,
}

#[cfg(test)]
mod test;
