//! Config factory for creating `config.json` documents.
//!
//! Produces JSON values in the exact shape the bot reads from disk, so tests can
//! either write them with `TestBuilder::with_config` or parse them directly.

use serde_json::{json, Value};

use crate::factory::helpers::next_id;

/// Factory for creating test configuration documents.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::config::ConfigFactory;
///
/// let config = ConfigFactory::new()
///     .guild(111, 222)
///     .log_channel(999)
///     .include_dates(true)
///     .build();
/// ```
pub struct ConfigFactory {
    client_id: String,
    bot_token: String,
    guilds: Vec<Value>,
    log_channel_id: Option<u64>,
    include_dates: bool,
    parser_command: Option<Vec<String>>,
}

impl ConfigFactory {
    /// Creates a new ConfigFactory with default values and no guilds.
    ///
    /// Defaults:
    /// - client_id: unique snowflake-like id
    /// - bot_token: `"test-bot-token"`
    /// - no log channel, dates excluded, no replay tools
    pub fn new() -> Self {
        Self {
            client_id: next_id().to_string(),
            bot_token: "test-bot-token".to_string(),
            guilds: Vec::new(),
            log_channel_id: None,
            include_dates: false,
            parser_command: None,
        }
    }

    /// Adds a guild with the given settings channel.
    pub fn guild(mut self, guild_id: u64, settings_channel_id: u64) -> Self {
        self.guilds.push(json!({
            "id": guild_id.to_string(),
            "channelIds": {"settings": settings_channel_id.to_string()},
        }));
        self
    }

    /// Adds a guild with a custom emoji mapping.
    pub fn guild_with_emoji(
        mut self,
        guild_id: u64,
        settings_channel_id: u64,
        emoji_mapping: Value,
    ) -> Self {
        self.guilds.push(json!({
            "id": guild_id.to_string(),
            "channelIds": {"settings": settings_channel_id.to_string()},
            "emojiMapping": emoji_mapping,
        }));
        self
    }

    /// Sets the channel that receives mirrored log output.
    pub fn log_channel(mut self, channel_id: u64) -> Self {
        self.log_channel_id = Some(channel_id);
        self
    }

    /// Sets whether log timestamps include the date.
    pub fn include_dates(mut self, include_dates: bool) -> Self {
        self.include_dates = include_dates;
        self
    }

    /// Sets the external replay parser command.
    pub fn parser_command(mut self, command: &[&str]) -> Self {
        self.parser_command = Some(command.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Builds the config document.
    pub fn build(self) -> Value {
        let mut discord = json!({
            "credentials": {
                "clientId": self.client_id,
                "botToken": self.bot_token,
            },
            "guilds": self.guilds,
        });
        if let Some(channel_id) = self.log_channel_id {
            discord["logChannelId"] = json!(channel_id.to_string());
        }

        let mut config = json!({
            "discord": discord,
            "twitch": {
                "appCredentials": {
                    "clientId": "twitch-client-id",
                    "clientSecret": "twitch-client-secret",
                    "redirectUri": "http://localhost",
                },
                "apiCredentials": {
                    "authCode": "twitch-auth-code",
                    "userName": "hydrabot",
                },
            },
            "logging": {"includeDates": self.include_dates},
        });
        if let Some(command) = self.parser_command {
            config["replay"] = json!({"parserCommand": command});
        }

        config
    }
}

impl Default for ConfigFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a config document with one guild and default values.
pub fn create_config() -> Value {
    ConfigFactory::new().guild(next_id(), next_id()).build()
}
