use serde_json::json;
use serenity::all::GuildId;
use test_utils::{builder::TestBuilder, error::TestError};

use crate::{
    data::{
        ensure_dir,
        guild_cache::{GuildCacheRepository, GuildCachePatch},
        token::{StoredToken, TokenRepository},
    },
    error::cache::CacheError,
};

mod guild_cache;
mod token;
