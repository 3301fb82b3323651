//! Slash command deployment.
//!
//! Commands are registered per guild. Each guild's cache remembers the hash of the
//! command set last deployed to it, and guilds whose hash matches the current set
//! are left alone, so restarts do not re-register unchanged commands.

use std::path::Path;

use serenity::all::{CreateCommand, GuildId, Http};
use serenity::async_trait;

use crate::{
    config::GuildConfig,
    data::guild_cache::{GuildCachePatch, GuildCacheRepository},
    error::AppError,
    util::format::plural,
};

/// Replaces the full set of commands registered to a guild.
#[async_trait]
pub trait CommandRegistrar: Send + Sync {
    /// Returns the number of commands registered after the replacement.
    async fn replace_guild_commands(
        &self,
        guild_id: GuildId,
        commands: &[CreateCommand],
    ) -> Result<usize, AppError>;
}

#[async_trait]
impl CommandRegistrar for Http {
    async fn replace_guild_commands(
        &self,
        guild_id: GuildId,
        commands: &[CreateCommand],
    ) -> Result<usize, AppError> {
        let registered = self.create_guild_commands(guild_id, &commands).await?;
        Ok(registered.len())
    }
}

/// What happened to a single guild during deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuildDeployment {
    /// The guild already has the current command set.
    Skipped,
    Deployed { count: usize },
    /// Reading the cache or registering failed; the error message is kept.
    Failed(String),
}

/// Deploys commands to every configured guild whose command hash differs.
///
/// Guilds are processed in config order. A failure in one guild is logged and does
/// not stop the others; that guild's cache is left untouched so the next start
/// tries again.
///
/// # Arguments
/// - `registrar` - Discord command registration
/// - `guilds` - Configured guilds
/// - `cache_dir` - Directory holding the guild caches
/// - `commands` - Command definitions, sorted by name
/// - `hash` - Hash of `commands`
///
/// # Returns
/// - Outcome per guild, in config order
pub async fn deploy_guild_commands(
    registrar: &dyn CommandRegistrar,
    guilds: &[GuildConfig],
    cache_dir: &Path,
    commands: &[CreateCommand],
    hash: &str,
) -> Vec<(GuildId, GuildDeployment)> {
    let repo = GuildCacheRepository::new(cache_dir);
    let mut report = Vec::with_capacity(guilds.len());

    for guild in guilds {
        let outcome = match deploy_guild(&repo, registrar, guild.id, commands, hash).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Failed to deploy commands to guild {}: {}", guild.id, e);
                GuildDeployment::Failed(e.to_string())
            }
        };
        report.push((guild.id, outcome));
    }

    report
}

async fn deploy_guild(
    repo: &GuildCacheRepository<'_>,
    registrar: &dyn CommandRegistrar,
    guild_id: GuildId,
    commands: &[CreateCommand],
    hash: &str,
) -> Result<GuildDeployment, AppError> {
    let cache = repo.read(guild_id).await?;
    if cache.command_hash() == Some(hash) {
        tracing::debug!("Commands of guild {} are up to date", guild_id);
        return Ok(GuildDeployment::Skipped);
    }

    let count = registrar.replace_guild_commands(guild_id, commands).await?;
    tracing::info!(
        "Deployed {} {} to guild {}, hash 0x{}",
        count,
        plural(count, "command"),
        guild_id,
        hash
    );

    repo.write(guild_id, GuildCachePatch::new().command_hash(hash))
        .await?;

    Ok(GuildDeployment::Deployed { count })
}

#[cfg(test)]
mod test;
