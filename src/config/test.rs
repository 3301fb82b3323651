use serde_json::json;
use serenity::all::{ChannelId, GuildId};
use test_utils::{
    builder::TestBuilder,
    error::TestError,
    factory::config::{create_config, ConfigFactory},
};

use crate::{
    config::{Config, CONFIG_FILE_NAME},
    error::config::ConfigError,
};

/// Tests reading from a config directory without `config.json`.
///
/// Expected: Err(ConfigError::Missing) naming the expected file
#[tokio::test]
async fn missing_file_is_reported() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;

    let result = Config::read(test.config_dir()).await;

    match result {
        Err(ConfigError::Missing { path }) => {
            assert_eq!(path, test.config_dir().join(CONFIG_FILE_NAME));
        }
        other => panic!("expected missing config error, got {:?}", other),
    }

    Ok(())
}

/// Tests that a missing config directory is created before reading.
///
/// Expected: Err(ConfigError::Missing), directory exists afterwards
#[tokio::test]
async fn creates_config_directory() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let dir = test.root().join("fresh").join("hydrabot");

    let result = Config::read(&dir).await;

    assert!(matches!(result, Err(ConfigError::Missing { .. })));
    assert!(dir.is_dir());

    Ok(())
}

/// Tests reading malformed JSON.
///
/// Expected: Err(ConfigError::Parse)
#[tokio::test]
async fn malformed_json_is_parse_error() -> Result<(), TestError> {
    let test = TestBuilder::new().with_raw_config("{\"discord\": ").build()?;

    let result = Config::read(test.config_dir()).await;

    assert!(matches!(result, Err(ConfigError::Parse { .. })));

    Ok(())
}

/// Tests that required fields are never defaulted.
///
/// Expected: Err(ConfigError::Parse) when the Twitch section is absent
#[tokio::test]
async fn missing_required_section_is_parse_error() -> Result<(), TestError> {
    let mut config = create_config();
    config.as_object_mut().unwrap().remove("twitch");
    let test = TestBuilder::new().with_config(config).build()?;

    let result = Config::read(test.config_dir()).await;

    assert!(matches!(result, Err(ConfigError::Parse { .. })));

    Ok(())
}

/// Tests reading a complete configuration.
///
/// Expected: Ok(Config) with guilds, log channel and logging options
#[tokio::test]
async fn reads_valid_config() -> Result<(), TestError> {
    let config = ConfigFactory::new()
        .guild(111, 222)
        .guild_with_emoji(333, 444, json!({"zerg": ["zerg_icon"]}))
        .log_channel(999)
        .include_dates(true)
        .parser_command(&["screp", "-cmds=false"])
        .build();
    let test = TestBuilder::new().with_config(config).build()?;

    let config = Config::read(test.config_dir()).await.unwrap();

    assert_eq!(config.discord.guilds.len(), 2);
    assert_eq!(config.discord.guilds[0].id, GuildId::new(111));
    assert_eq!(
        config.discord.guilds[0].channel_ids.settings,
        ChannelId::new(222)
    );
    assert_eq!(
        config.discord.guilds[1].emoji_mapping["zerg"],
        vec!["zerg_icon".to_string()]
    );
    assert_eq!(config.discord.log_channel_id, Some(ChannelId::new(999)));
    assert!(config.logging.include_dates);
    assert_eq!(
        config.replay.parser_command,
        Some(vec!["screp".to_string(), "-cmds=false".to_string()])
    );
    assert_eq!(config.replay.map_image_command, None);
    assert_eq!(config.twitch.api_credentials.user_name, "hydrabot");

    Ok(())
}

/// Tests that optional sections default to disabled.
///
/// Expected: no log channel, dates excluded, no replay tools
#[test]
fn optional_sections_default_to_disabled() {
    let config = Config::parse(
        &json!({
            "discord": {
                "credentials": {"clientId": "1", "botToken": "token"},
                "guilds": [],
            },
            "twitch": {
                "appCredentials": {
                    "clientId": "id",
                    "clientSecret": "secret",
                    "redirectUri": "http://localhost",
                },
                "apiCredentials": {"authCode": "code", "userName": "user"},
            },
        })
        .to_string(),
    )
    .unwrap();

    assert!(config.discord.guilds.is_empty());
    assert_eq!(config.discord.log_channel_id, None);
    assert!(!config.logging.include_dates);
    assert!(config.replay.parser_command.is_none());
}

/// Tests guild lookup by id.
///
/// Expected: configured guild found, unknown guild absent
#[test]
fn finds_guild_by_id() {
    let config = Config::parse(&ConfigFactory::new().guild(5, 6).build().to_string()).unwrap();

    assert!(config.guild(GuildId::new(5)).is_some());
    assert!(config.guild(GuildId::new(7)).is_none());
}
