use super::*;

/// Tests that consecutive writes of different keys are merged.
///
/// Expected: `{a: 1}` then `{b: 2}` yields `{a: 1, b: 2}`
#[tokio::test]
async fn merges_distinct_keys() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let repo = GuildCacheRepository::new(test.cache_dir());
    let guild_id = GuildId::new(1);

    repo.write(guild_id, GuildCachePatch::new().set("a", json!(1)))
        .await
        .unwrap();
    repo.write(guild_id, GuildCachePatch::new().set("b", json!(2)))
        .await
        .unwrap();

    assert_eq!(test.read_guild_cache(1)?, Some(json!({"a": 1, "b": 2})));

    Ok(())
}

/// Tests that writing an existing key overwrites it.
///
/// Expected: `{a: 1}` then `{a: 3}` yields `{a: 3}`
#[tokio::test]
async fn overwrites_existing_key() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let repo = GuildCacheRepository::new(test.cache_dir());
    let guild_id = GuildId::new(2);

    repo.write(guild_id, GuildCachePatch::new().set("a", json!(1)))
        .await
        .unwrap();
    let merged = repo
        .write(guild_id, GuildCachePatch::new().set("a", json!(3)))
        .await
        .unwrap();

    assert_eq!(merged.get("a"), Some(&json!(3)));
    assert_eq!(test.read_guild_cache(2)?, Some(json!({"a": 3})));

    Ok(())
}

/// Tests that a command hash write preserves unrelated keys.
///
/// Expected: previous `livestreamsLastLive` kept, `commandHash` replaced
#[tokio::test]
async fn command_hash_write_preserves_other_fields() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_guild_cache(
            3,
            json!({
                "commandHash": "old",
                "livestreamsLastLive": {"Flash": "2024-03-01T12:00:00Z"},
            }),
        )
        .build()?;
    let repo = GuildCacheRepository::new(test.cache_dir());

    repo.write(GuildId::new(3), GuildCachePatch::new().command_hash("new"))
        .await
        .unwrap();

    let stored = test.read_guild_cache(3)?.unwrap();
    assert_eq!(stored["commandHash"], json!("new"));
    assert_eq!(
        stored["livestreamsLastLive"],
        json!({"Flash": "2024-03-01T12:00:00Z"})
    );

    Ok(())
}

/// Tests that the cache is written as pretty-printed JSON.
///
/// Expected: file content spans multiple lines
#[tokio::test]
async fn writes_pretty_json() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let repo = GuildCacheRepository::new(test.cache_dir());

    repo.write(GuildId::new(4), GuildCachePatch::new().command_hash("abc"))
        .await
        .unwrap();

    let content = std::fs::read_to_string(test.guild_cache_path(4))?;
    assert!(content.contains("\n  \"commandHash\": \"abc\""));

    Ok(())
}
