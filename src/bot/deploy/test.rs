use std::sync::Mutex;

use serde_json::json;
use test_utils::{builder::TestBuilder, error::TestError};
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

use super::*;
use crate::{module::hash::calc_command_hash, testing::proxy_http};

const GUILD_A: u64 = 111;
const GUILD_B: u64 = 222;

/// Registrar recording every call; guilds in `failing` return an error.
#[derive(Default)]
struct FakeRegistrar {
    calls: Mutex<Vec<(GuildId, usize)>>,
    failing: Vec<GuildId>,
}

#[async_trait]
impl CommandRegistrar for FakeRegistrar {
    async fn replace_guild_commands(
        &self,
        guild_id: GuildId,
        commands: &[CreateCommand],
    ) -> Result<usize, AppError> {
        self.calls.lock().unwrap().push((guild_id, commands.len()));
        if self.failing.contains(&guild_id) {
            return Err(AppError::InternalError("Missing Access".to_string()));
        }
        Ok(commands.len())
    }
}

fn guild(id: u64) -> GuildConfig {
    serde_json::from_value(json!({"id": id.to_string(), "channelIds": {"settings": "1"}})).unwrap()
}

fn commands() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("about").description("Shows information about the bot"),
        CreateCommand::new("help").description("Lists commands"),
    ]
}

/// Tests deploying to a guild whose cached hash matches.
///
/// Expected: Skipped, no registration call
#[tokio::test]
async fn skips_guild_with_current_hash() -> Result<(), TestError> {
    let hash = calc_command_hash(&commands()).unwrap();
    let test = TestBuilder::new()
        .with_guild_cache(GUILD_A, json!({"commandHash": hash}))
        .build()?;
    let registrar = FakeRegistrar::default();

    let report = deploy_guild_commands(
        &registrar,
        &[guild(GUILD_A)],
        test.cache_dir(),
        &commands(),
        &hash,
    )
    .await;

    assert_eq!(report, vec![(GuildId::new(GUILD_A), GuildDeployment::Skipped)]);
    assert!(registrar.calls.lock().unwrap().is_empty());
    Ok(())
}

/// Tests deploying to a guild with an outdated hash.
///
/// Verifies that exactly one registration happens and the cache then holds the new
/// hash next to its other keys.
///
/// Expected: Deployed { count: 2 }
#[tokio::test]
async fn deploys_guild_with_outdated_hash() -> Result<(), TestError> {
    let hash = calc_command_hash(&commands()).unwrap();
    let test = TestBuilder::new()
        .with_guild_cache(GUILD_A, json!({"commandHash": "stale", "livestreamsLastLive": {}}))
        .build()?;
    let registrar = FakeRegistrar::default();

    let report = deploy_guild_commands(
        &registrar,
        &[guild(GUILD_A)],
        test.cache_dir(),
        &commands(),
        &hash,
    )
    .await;

    assert_eq!(report, vec![(GuildId::new(GUILD_A), GuildDeployment::Deployed { count: 2 })]);
    assert_eq!(registrar.calls.lock().unwrap().clone(), vec![(GuildId::new(GUILD_A), 2)]);
    let cache = test.read_guild_cache(GUILD_A)?.unwrap();
    assert_eq!(cache["commandHash"], json!(hash));
    assert_eq!(cache["livestreamsLastLive"], json!({}));
    Ok(())
}

/// Tests deploying to a guild that has no cache yet.
///
/// Expected: Deployed, cache file created with the hash
#[tokio::test]
async fn deploys_fresh_guild() -> Result<(), TestError> {
    let hash = calc_command_hash(&commands()).unwrap();
    let test = TestBuilder::new().build()?;
    let registrar = FakeRegistrar::default();

    let report = deploy_guild_commands(
        &registrar,
        &[guild(GUILD_A)],
        test.cache_dir(),
        &commands(),
        &hash,
    )
    .await;

    assert_eq!(report[0].1, GuildDeployment::Deployed { count: 2 });
    assert_eq!(test.read_guild_cache(GUILD_A)?.unwrap(), json!({"commandHash": hash}));
    Ok(())
}

/// Tests a registration failure in the first of two guilds.
///
/// Verifies that the second guild is still deployed and the failing guild's cache
/// is left untouched.
///
/// Expected: [Failed, Deployed]
#[tokio::test]
async fn isolates_failing_guild() -> Result<(), TestError> {
    let hash = calc_command_hash(&commands()).unwrap();
    let test = TestBuilder::new()
        .with_guild_cache(GUILD_A, json!({"commandHash": "stale"}))
        .build()?;
    let registrar = FakeRegistrar {
        failing: vec![GuildId::new(GUILD_A)],
        ..FakeRegistrar::default()
    };

    let report = deploy_guild_commands(
        &registrar,
        &[guild(GUILD_A), guild(GUILD_B)],
        test.cache_dir(),
        &commands(),
        &hash,
    )
    .await;

    assert!(matches!(report[0].1, GuildDeployment::Failed(_)));
    assert_eq!(report[1].1, GuildDeployment::Deployed { count: 2 });
    assert_eq!(test.read_guild_cache(GUILD_A)?.unwrap(), json!({"commandHash": "stale"}));
    assert_eq!(test.read_guild_cache(GUILD_B)?.unwrap()["commandHash"], json!(hash));
    Ok(())
}

/// Tests a guild whose cache file cannot be parsed.
///
/// Expected: Failed without a registration call for that guild
#[tokio::test]
async fn fails_guild_with_broken_cache() -> Result<(), TestError> {
    let hash = calc_command_hash(&commands()).unwrap();
    let test = TestBuilder::new()
        .with_cache_file(format!("guild_{}.json", GUILD_A), "{broken")
        .build()?;
    let registrar = FakeRegistrar::default();

    let report = deploy_guild_commands(
        &registrar,
        &[guild(GUILD_A)],
        test.cache_dir(),
        &commands(),
        &hash,
    )
    .await;

    assert!(matches!(report[0].1, GuildDeployment::Failed(_)));
    assert!(registrar.calls.lock().unwrap().is_empty());
    Ok(())
}

/// Tests the Discord registrar.
///
/// Verifies that the whole command set is sent in one bulk overwrite request.
///
/// Expected: one PUT to the guild's application commands
#[tokio::test]
async fn http_registrar_overwrites_guild_commands() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/api/v10/applications/1/guilds/{}/commands", GUILD_A)))
        .and(body_string_contains("\"about\""))
        .and(body_string_contains("\"help\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let http = proxy_http(&server.uri());

    let count = http
        .replace_guild_commands(GuildId::new(GUILD_A), &commands())
        .await
        .unwrap();

    assert_eq!(count, 0);
}
