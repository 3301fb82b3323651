use super::*;

/// Tests reading the cache of a guild that has never been cached.
///
/// Verifies that an empty record is returned and an empty file is created.
///
/// Expected: Ok(empty record), file `guild_<id>.json` containing `{}`
#[tokio::test]
async fn creates_empty_record_for_fresh_guild() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let repo = GuildCacheRepository::new(test.cache_dir());

    let cache = repo.read(GuildId::new(1234)).await.unwrap();

    assert!(cache.is_empty());
    assert_eq!(test.read_guild_cache(1234)?, Some(json!({})));

    Ok(())
}

/// Tests reading the cache when the cache directory does not exist yet.
///
/// Expected: Ok(empty record), directory created
#[tokio::test]
async fn creates_missing_cache_directory() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let cache_dir = test.root().join("not-yet-created");
    let repo = GuildCacheRepository::new(&cache_dir);

    let cache = repo.read(GuildId::new(42)).await.unwrap();

    assert!(cache.is_empty());
    assert!(cache_dir.join("guild_42.json").is_file());

    Ok(())
}

/// Tests reading an existing record.
///
/// Expected: command hash and last-live timestamps parsed from the file
#[tokio::test]
async fn reads_existing_record() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_guild_cache(
            77,
            json!({
                "commandHash": "deadbeef",
                "livestreamsLastLive": {
                    "Flash": "2024-03-01T12:00:00Z",
                    "Broken": "not a timestamp",
                },
            }),
        )
        .build()?;
    let repo = GuildCacheRepository::new(test.cache_dir());

    let cache = repo.read(GuildId::new(77)).await.unwrap();

    assert_eq!(cache.command_hash(), Some("deadbeef"));
    let last_live = cache.livestreams_last_live();
    assert_eq!(last_live.len(), 1);
    assert_eq!(
        last_live["Flash"].to_rfc3339(),
        "2024-03-01T12:00:00+00:00"
    );

    Ok(())
}

/// Tests reading a corrupt cache file.
///
/// Verifies that parse failures propagate instead of being replaced by an empty
/// record.
///
/// Expected: Err(CacheError::Parse)
#[tokio::test]
async fn fails_on_malformed_file() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_cache_file("guild_5.json", "{not json")
        .build()?;
    let repo = GuildCacheRepository::new(test.cache_dir());

    let result = repo.read(GuildId::new(5)).await;

    assert!(matches!(result, Err(CacheError::Parse { .. })));

    Ok(())
}

/// Tests reading a cache file holding a JSON array.
///
/// Expected: Err(CacheError::NotAnObject)
#[tokio::test]
async fn fails_on_non_object_file() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_cache_file("guild_6.json", "[1, 2, 3]")
        .build()?;
    let repo = GuildCacheRepository::new(test.cache_dir());

    let result = repo.read(GuildId::new(6)).await;

    assert!(matches!(result, Err(CacheError::NotAnObject { .. })));

    Ok(())
}
