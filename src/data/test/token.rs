use super::*;

/// Tests reading a token that was never stored.
///
/// Expected: Ok(empty token), no file created
#[tokio::test]
async fn missing_token_reads_as_empty() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let repo = TokenRepository::new(test.cache_dir());

    let token = repo.read(Some("api")).await.unwrap();

    assert_eq!(token, StoredToken::default());
    assert!(!repo.path(Some("api")).exists());

    Ok(())
}

/// Tests that storing a refreshed token keeps fields the refresh did not return.
///
/// Expected: new access token, old refresh token kept
#[tokio::test]
async fn store_merges_with_existing_token() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let repo = TokenRepository::new(test.cache_dir());

    repo.store(
        Some("api"),
        &StoredToken {
            access_token: Some("first".to_string()),
            refresh_token: Some("refresh".to_string()),
            scope: vec!["user:read:email".to_string()],
            expires_in: Some(3600),
            obtainment_timestamp: Some(1_000),
        },
    )
    .await
    .unwrap();
    repo.store(
        Some("api"),
        &StoredToken {
            access_token: Some("second".to_string()),
            obtainment_timestamp: Some(2_000),
            ..StoredToken::default()
        },
    )
    .await
    .unwrap();

    let token = repo.read(Some("api")).await.unwrap();
    assert_eq!(token.access_token.as_deref(), Some("second"));
    assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
    assert_eq!(token.obtainment_timestamp, Some(2_000));

    Ok(())
}

/// Tests token file naming.
///
/// Expected: `token.json` without a name, `token_<name>.json` with one
#[test]
fn token_file_names() {
    let repo = TokenRepository::new(std::path::Path::new("/cache"));

    assert_eq!(repo.path(None), std::path::PathBuf::from("/cache/token.json"));
    assert_eq!(
        repo.path(Some("api")),
        std::path::PathBuf::from("/cache/token_api.json")
    );
}

/// Tests expiry detection.
///
/// Expected: expired within the one-minute margin, valid before it, and never
/// expired without expiry information
#[test]
fn token_expiry() {
    let token = StoredToken {
        expires_in: Some(3600),
        obtainment_timestamp: Some(0),
        ..StoredToken::default()
    };

    assert!(!token.is_expired(3_000_000));
    assert!(token.is_expired(3_550_000));
    assert!(!StoredToken::default().is_expired(i64::MAX / 2));
}
