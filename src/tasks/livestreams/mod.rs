//! Keeps a list of community livestreams up to date.
//!
//! Each guild chooses the channel and the listed streamers through its remote
//! settings. Every cycle the task checks who is live on Twitch and rewrites the
//! bot's message in that channel.

pub mod embed;

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, MessageId};
use serenity::async_trait;
use tokio::sync::Mutex;

use crate::{
    bot::static_message::StaticMessage,
    config::GuildConfig,
    data::guild_cache::{GuildCachePatch, GuildCacheRepository},
    error::AppError,
    module::{Manifest, ModuleContext, Task},
    service::remote::{fetch_emoji_decorator, fetch_remote_settings, fetch_user_role_meta},
};

use embed::{build_embed, sort_streamers, StreamerStatus};

pub const UPDATE_INTERVAL: Duration = Duration::from_millis(60_000);

#[derive(Default)]
pub struct Livestreams {
    /// Messages posted or found in earlier cycles, per list channel.
    messages: Mutex<HashMap<ChannelId, MessageId>>,
}

#[async_trait]
impl Task for Livestreams {
    fn manifest(&self) -> Option<Manifest> {
        Some(
            Manifest::new("livestreams", "Keeps a list of community livestreams up to date.")
                .every(UPDATE_INTERVAL)
                .on_startup(),
        )
    }

    async fn run(&self, cycle: u64, ctx: &ModuleContext) -> Result<(), AppError> {
        if cycle == 0 {
            tracing::info!("Initial update of the livestreams list");
        }

        let mut failed = 0;
        for guild in &ctx.state.config.discord.guilds {
            if let Err(e) = self.update_guild(guild, ctx, Utc::now()).await {
                tracing::warn!(
                    "Could not update the livestreams list of guild {}: {}",
                    guild.id,
                    e
                );
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(AppError::InternalError(format!(
                "{} of {} guilds failed",
                failed,
                ctx.state.config.discord.guilds.len()
            )));
        }
        Ok(())
    }
}

impl Livestreams {
    /// Refreshes the livestreams list of a single guild.
    ///
    /// Guilds without a list channel in their remote settings are skipped.
    async fn update_guild(
        &self,
        guild: &GuildConfig,
        ctx: &ModuleContext,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let settings = fetch_remote_settings(&ctx.http, guild.channel_ids.settings)
            .await?
            .livestreams;
        let Some(channel_id) = settings.channel_id else {
            tracing::debug!("No livestreams channel set for guild {}", guild.id);
            return Ok(());
        };

        let decorator = fetch_emoji_decorator(&ctx.http, guild.id, &guild.emoji_mapping).await?;
        let usernames: Vec<String> = settings
            .users
            .iter()
            .map(|user| user.username.clone())
            .collect();
        let members = fetch_user_role_meta(&ctx.http, guild.id, &usernames).await?;

        let repository = GuildCacheRepository::new(&ctx.state.paths.cache);
        let mut last_live = repository.read(guild.id).await?.livestreams_last_live();

        let mut streamers = Vec::with_capacity(settings.users.len());
        for entry in settings.users {
            let stream = match ctx
                .state
                .services
                .streams
                .stream_status(&entry.twitch_username)
                .await
            {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(
                        "Could not get the stream status of {}: {}",
                        entry.twitch_username,
                        e
                    );
                    None
                }
            };
            if stream.is_some() {
                last_live.insert(entry.username.clone(), now);
            }

            streamers.push(StreamerStatus {
                member: members.get(&entry.username).copied(),
                last_live: last_live.get(&entry.username).copied(),
                stream,
                entry,
            });
        }

        if streamers.iter().any(|status| status.stream.is_some()) {
            repository
                .write(guild.id, GuildCachePatch::new().livestreams_last_live(&last_live))
                .await?;
        }

        sort_streamers(&mut streamers);
        let embed = build_embed(&streamers, &decorator, now);
        let content = Some(settings.description).filter(|description| !description.is_empty());

        let mut messages = self.messages.lock().await;
        let mut message = StaticMessage::locate(
            &ctx.http,
            channel_id,
            messages.get(&channel_id).copied(),
            ctx.bot_user_id,
        )
        .await;
        let message_id = message.update(&ctx.http, content, vec![embed]).await?;
        messages.insert(channel_id, message_id);

        tracing::debug!(
            "Updated the livestreams list of guild {} ({} live)",
            guild.id,
            streamers.iter().filter(|status| status.stream.is_some()).count()
        );

        Ok(())
    }
}

#[cfg(test)]
mod test;
