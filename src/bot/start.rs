use serenity::all::{ApplicationId, ClientBuilder, GatewayIntents, Http, HttpBuilder};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    bot::handler::Handler, config::DiscordConfig, error::config::ConfigError, error::AppError,
    state::AppState,
};

/// Gateway intents the bot needs.
///
/// Reading attachments requires message content; looking up streamers' roles
/// requires guild members.
pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT
}

/// Parses the configured Discord client ID.
pub fn application_id(config: &DiscordConfig) -> Result<ApplicationId, ConfigError> {
    let client_id = &config.credentials.client_id;
    client_id
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(ApplicationId::new)
        .ok_or_else(|| ConfigError::Invalid {
            field: "discord.credentials.clientId",
            value: client_id.clone(),
        })
}

/// Creates a Discord REST client for the configured application.
pub fn discord_http(config: &DiscordConfig) -> Result<Http, AppError> {
    Ok(HttpBuilder::new(&config.credentials.bot_token)
        .application_id(application_id(config)?)
        .build())
}

/// Starts the Discord bot
///
/// Connects to the gateway and processes events until the connection is closed
/// for good.
///
/// # Arguments
/// - `state` - Application state shared with every event
/// - `log_mirror` - Mirrored log lines for the log channel, if any
///
/// # Returns
/// - `Ok(())` - The gateway connection ended
/// - `Err(AppError::DiscordErr)` - The client could not be created or connected
pub async fn start_bot(
    state: AppState,
    log_mirror: Option<UnboundedReceiver<String>>,
) -> Result<(), AppError> {
    let http = discord_http(&state.config.discord)?;
    let handler = Handler::new(state, log_mirror);

    let mut client = ClientBuilder::new_with_http(http, gateway_intents())
        .event_handler(handler)
        .await?;

    client.start().await?;

    Ok(())
}
