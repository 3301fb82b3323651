use std::collections::HashMap;

use chrono::TimeZone;
use serde_json::json;
use serenity::all::{GuildId, UserId};
use test_utils::{
    factory::config::ConfigFactory,
    serenity::{emoji_json, member_json, message_json, role_json},
};
use wiremock::{
    matchers::{body_string_contains, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use super::embed::{build_embed, sort_streamers, StreamerStatus};
use super::*;
use crate::{
    data::guild_cache::GuildCacheRepository,
    module::registry::ModuleRegistry,
    service::{
        remote::{EmojiDecorator, MemberMeta},
        twitch::StreamInfo,
    },
    testing::{proxy_http, services, test_context, test_state, FakeStreams, BOT_USER_ID},
    util::{
        roles::{Race, Rank, RoleMeta},
        settings::StreamerEntry,
    },
};

const GUILD: u64 = 700;
const SETTINGS_CHANNEL: u64 = 710;
const LIST_CHANNEL: u64 = 720;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn stream(login: &str, game: &str, viewers: u64) -> StreamInfo {
    StreamInfo {
        id: format!("stream-{}", login),
        user_id: format!("user-{}", login),
        user_login: login.to_string(),
        user_name: login.to_string(),
        game_name: game.to_string(),
        kind: "live".to_string(),
        title: format!("{} plays", login),
        viewer_count: viewers,
        started_at: Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap(),
        thumbnail_url: String::new(),
        tags: Vec::new(),
    }
}

fn status(name: &str, stream: Option<StreamInfo>, roles: Option<RoleMeta>) -> StreamerStatus {
    StreamerStatus {
        entry: StreamerEntry {
            username: name.to_string(),
            twitch_url: format!("https://twitch.tv/{}", name.to_lowercase()),
            twitch_username: name.to_lowercase(),
        },
        member: roles.map(|roles| MemberMeta {
            user_id: UserId::new(1000 + name.len() as u64),
            roles,
        }),
        stream,
        last_live: None,
    }
}

fn names(streamers: &[StreamerStatus]) -> Vec<&str> {
    streamers
        .iter()
        .map(|status| status.entry.username.as_str())
        .collect()
}

fn description(embed: &serenity::all::CreateEmbed) -> String {
    serde_json::to_value(embed).unwrap()["description"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Tests the order of the livestreams list.
///
/// Verifies that live streamers come first, then the order of rank, race and
/// name; streamers without roles sort after those with roles.
///
/// Expected: live A rank, live unranked, offline by rank then race then name
#[test]
fn test_sort_streamers() {
    let zerg_b = RoleMeta {
        rank: Some(Rank::B),
        race: Some(Race::Zerg),
    };
    let terran_b = RoleMeta {
        rank: Some(Rank::B),
        race: Some(Race::Terran),
    };
    let mut streamers = vec![
        status("nobody", None, None),
        status("Zed", None, Some(zerg_b)),
        status("Tess", None, Some(terran_b)),
        status("Abe", None, Some(terran_b)),
        status("Live", Some(stream("live", "StarCraft", 3)), None),
        status(
            "Ace",
            Some(stream("ace", "StarCraft", 3)),
            Some(RoleMeta {
                rank: Some(Rank::A),
                race: None,
            }),
        ),
    ];

    sort_streamers(&mut streamers);

    assert_eq!(names(&streamers), vec!["Ace", "Live", "Abe", "Tess", "Zed", "nobody"]);
}

/// Tests the sections of the livestreams embed.
///
/// Verifies that StarCraft streams and other games are listed apart and that
/// offline streamers show when they were last live.
///
/// Expected: three sections with one streamer each
#[test]
fn test_embed_sections() {
    let mut offline = status("Jaedong", None, None);
    offline.last_live = Some(Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
    let streamers = vec![
        status(
            "Flash",
            Some(stream("flash", "StarCraft", 1200)),
            Some(RoleMeta {
                rank: Some(Rank::S),
                race: Some(Race::Terran),
            }),
        ),
        status("Bisu", Some(stream("bisu", "Just Chatting", 1)), None),
        offline,
    ];

    let embed = build_embed(&streamers, &EmojiDecorator::default(), now());
    let value = serde_json::to_value(&embed).unwrap();
    let text = description(&embed);

    assert_eq!(value["color"], 0x6441a5);
    assert_eq!(value["author"]["name"], "Twitch streams");
    assert!(text.starts_with(&format!("Last updated <t:{}:t>.", now().timestamp())));
    assert!(text.contains(
        "### Currently live\n* :ranks: :terran: <@1005> - [flash plays](https://twitch.tv/flash) \
         / [twitch.tv/flash](https://twitch.tv/flash)\n  1200 viewers, started <t:1709290800:R>"
    ));
    assert!(text.contains("### Playing something else\n* Bisu - "));
    assert!(text.contains("Just Chatting, 1 viewer, started"));
    assert!(text.ends_with(
        "### Offline\n* Jaedong - [twitch.tv/jaedong](https://twitch.tv/jaedong), \
         last live <t:1709208000:R>"
    ));
}

/// Tests the embed when nobody is live.
///
/// Expected: the empty fallback for live streams, no "something else" section
#[test]
fn test_embed_nobody_live() {
    let streamers = vec![status("Flash", None, None)];

    let text = description(&build_embed(&streamers, &EmojiDecorator::default(), now()));

    assert!(text.contains("### Currently live\nNone. :harold:"));
    assert!(!text.contains("Playing something else"));
    assert!(text.contains("### Offline\n* Flash - [twitch.tv/flash](https://twitch.tv/flash)"));
}

/// Tests a list too long for one embed description.
///
/// Verifies that live streamers are kept and the offline streamers that no longer
/// fit are counted instead of listed.
///
/// Expected: description within 4096 characters ending in "*and N more.*"
#[test]
fn test_embed_description_is_capped() {
    let mut streamers = vec![status("Flash", Some(stream("flash", "StarCraft", 1200)), None)];
    for index in 0..100 {
        streamers.push(status(&format!("Offline_streamer_number_{:03}", index), None, None));
    }

    let text = description(&build_embed(&streamers, &EmojiDecorator::default(), now()));

    assert!(text.chars().count() <= 4096);
    assert!(text.contains("* Flash - [flash plays]"));
    assert!(text.contains("* Offline_streamer_number_000 - "));
    assert!(!text.contains("Offline_streamer_number_099"));

    let listed = text.matches("* Offline_streamer_number_").count();
    assert!(text.ends_with(&format!("\n*and {} more.*", 100 - listed)));
}

async fn mount_get(server: &MockServer, url: String, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(url))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts the Discord responses of a guild listing Flash (live) and Jaedong.
async fn mount_guild(server: &MockServer, list_history: serde_json::Value) {
    let settings = "```ini\n[livestreams]\nchannelId = 720\ndescription = Community streams\n\
                    users[] = Flash <https://twitch.tv/flash>\n\
                    users[] = Jaedong <https://www.twitch.tv/jaedong>\n```";
    Mock::given(method("GET"))
        .and(path(format!("/api/v10/channels/{}/messages", SETTINGS_CHANNEL)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([message_json(1, SETTINGS_CHANNEL, 5, false, settings)])),
        )
        .mount(server)
        .await;
    mount_get(
        server,
        format!("/api/v10/guilds/{}/emojis", GUILD),
        json!([emoji_json(51, "terran")]),
    )
    .await;
    mount_get(
        server,
        format!("/api/v10/guilds/{}/roles", GUILD),
        json!([role_json(31, "S rank"), role_json(32, "Terran")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v10/guilds/{}/members/search", GUILD)))
        .and(query_param("query", "Flash"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([member_json(41, "flash", &[31, 32])])),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v10/guilds/{}/members/search", GUILD)))
        .and(query_param("query", "Jaedong"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v10/channels/{}/messages", LIST_CHANNEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_history))
        .mount(server)
        .await;
}

fn task_context(server: &MockServer, root: &std::path::Path) -> ModuleContext {
    let streams = FakeStreams {
        live: HashMap::from([("flash".to_string(), stream("flash", "StarCraft", 10))]),
        failing: Vec::new(),
    };
    let state = test_state(
        &ConfigFactory::new().guild(GUILD, SETTINGS_CHANNEL).build(),
        root,
        ModuleRegistry::new(),
        services(streams),
    );
    test_context(state, proxy_http(&server.uri()))
}

/// Tests a cycle for a guild without a previous list message.
///
/// Verifies that the list is posted with the description as content, decorated
/// with the guild's emoji, and that the live streamer is recorded in the guild
/// cache.
///
/// Expected: one new message, `livestreamsLastLive` holding Flash only
#[tokio::test]
async fn test_run_posts_list() {
    let server = MockServer::start().await;
    mount_guild(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v10/channels/{}/messages", LIST_CHANNEL)))
        .and(body_string_contains("Community streams"))
        .and(body_string_contains(":ranks: <:terran:51> <@41>"))
        .and(body_string_contains("### Offline\\n* Jaedong"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_json(
            90,
            LIST_CHANNEL,
            BOT_USER_ID,
            true,
            "Community streams",
        )))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = task_context(&server, dir.path());

    Livestreams::default().run(0, &ctx).await.unwrap();

    let cache = GuildCacheRepository::new(&ctx.state.paths.cache)
        .read(GuildId::new(GUILD))
        .await
        .unwrap();
    let last_live = cache.livestreams_last_live();
    assert_eq!(last_live.keys().collect::<Vec<_>>(), vec!["Flash"]);
}

/// Tests a cycle when the bot's list message already exists.
///
/// Expected: the existing message is edited, nothing new is posted
#[tokio::test]
async fn test_run_edits_existing_list() {
    let server = MockServer::start().await;
    mount_guild(
        &server,
        json!([message_json(88, LIST_CHANNEL, BOT_USER_ID, true, "old list")]),
    )
    .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/api/v10/channels/{}/messages/88", LIST_CHANNEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_json(
            88,
            LIST_CHANNEL,
            BOT_USER_ID,
            true,
            "Community streams",
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v10/channels/{}/messages", LIST_CHANNEL)))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = task_context(&server, dir.path());

    Livestreams::default().run(3, &ctx).await.unwrap();
}

/// Tests a guild whose settings name no list channel.
///
/// Expected: the guild is skipped without any message being posted
#[tokio::test]
async fn test_run_skips_guild_without_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v10/channels/{}/messages", SETTINGS_CHANNEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([message_json(
            1,
            SETTINGS_CHANNEL,
            5,
            false,
            "[livestreams]\ndescription = nothing yet"
        )])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = task_context(&server, dir.path());

    Livestreams::default().run(0, &ctx).await.unwrap();
}

/// Tests a guild whose settings channel cannot be read.
///
/// Expected: the cycle reports an error
#[tokio::test]
async fn test_run_reports_failed_guild() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v10/channels/{}/messages", SETTINGS_CHANNEL)))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": 50001,
            "message": "Missing Access",
        })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = task_context(&server, dir.path());

    let result = Livestreams::default().run(0, &ctx).await;

    assert!(matches!(result, Err(AppError::InternalError(_))));
}
