//! Startup sequence: initialization, then connecting to Discord.

use std::sync::Arc;

use crate::{
    bot::{
        deploy::{deploy_guild_commands, GuildDeployment},
        start::{discord_http, start_bot},
    },
    config::{Config, Paths},
    error::AppError,
    logging::{self, LogContext},
    module::registry::ModuleRegistry,
    service::{
        map_image::{CommandMapRenderer, MapRenderer},
        replay::{CommandReplayParser, ReplayParser},
        twitch::{TwitchClient, TwitchEndpoints},
    },
    state::{AppState, Services},
    util::lock::DirectoryLock,
    VERSION,
};

/// An initialized bot, ready to connect.
///
/// Holds the cache directory lock until dropped.
pub struct Bot {
    pub state: AppState,
    pub log: LogContext,
    _lock: DirectoryLock,
}

/// Creates the HTTP client used for Twitch and attachment downloads.
pub fn setup_reqwest_client() -> Result<reqwest::Client, AppError> {
    Ok(reqwest::Client::builder()
        .user_agent(format!("hydrabot/{}", VERSION))
        .build()?)
}

/// Builds the replay tools configured in `config.json`.
fn replay_services(
    config: &Config,
) -> (
    Option<Arc<dyn ReplayParser>>,
    Option<Arc<dyn MapRenderer>>,
) {
    let parser = config
        .replay
        .parser_command
        .clone()
        .filter(|command| !command.is_empty())
        .map(|command| Arc::new(CommandReplayParser::new(command)) as Arc<dyn ReplayParser>);
    let renderer = config
        .replay
        .map_image_command
        .clone()
        .filter(|command| !command.is_empty())
        .map(|command| Arc::new(CommandMapRenderer::new(command)) as Arc<dyn MapRenderer>);

    if parser.is_none() {
        tracing::info!("No replay parser configured, replay files will be ignored");
    }

    (parser, renderer)
}

/// Loads everything the bot needs before connecting to Discord.
///
/// Reads the config, sets up logging, loads the built-in modules, takes the
/// cache directory lock and authenticates with Twitch.
///
/// # Arguments
/// - `paths` - Config and cache directories
///
/// # Returns
/// - `Ok(Bot)` - Initialized bot
/// - `Err(AppError::ConfigErr)` - The config file is missing or invalid
/// - `Err(AppError::LockErr)` - Another instance uses the cache directory
/// - `Err(AppError::TwitchErr)` - Twitch authentication failed
pub async fn init(paths: Paths) -> Result<Bot, AppError> {
    let config = Config::read(&paths.config).await?;
    let log = logging::init(&config.logging, config.discord.log_channel_id.is_some());

    tracing::info!("HydraBot v{}", VERSION);
    tracing::debug!(
        "Using config from {} and cache in {}",
        paths.config.display(),
        paths.cache.display()
    );

    let registry = ModuleRegistry::builtin();
    let counts = registry.counts();
    tracing::info!(
        "Loaded {} commands, {} message handlers and {} tasks",
        counts.commands,
        counts.handlers,
        counts.tasks
    );

    let lock = DirectoryLock::acquire(&paths.cache).await?;

    let http_client = setup_reqwest_client()?;
    let twitch = TwitchClient::connect(
        &config.twitch,
        &paths.cache,
        http_client.clone(),
        TwitchEndpoints::default(),
    )
    .await?;

    let (replay_parser, map_renderer) = replay_services(&config);
    let services = Services {
        http_client,
        streams: Arc::new(twitch),
        replay_parser,
        map_renderer,
    };

    Ok(Bot {
        state: AppState::new(config, paths, registry, services),
        log,
        _lock: lock,
    })
}

/// Deploys outdated slash commands and runs the bot until the gateway closes.
///
/// Deployment failures are logged per guild and do not stop the bot.
pub async fn connect(bot: Bot) -> Result<(), AppError> {
    let Bot {
        state,
        mut log,
        _lock,
    } = bot;

    let http = discord_http(&state.config.discord)?;
    let hash = state.registry.command_hash()?;
    let report = deploy_guild_commands(
        &http,
        &state.config.discord.guilds,
        &state.paths.cache,
        &state.registry.command_definitions(),
        &hash,
    )
    .await;

    let failed = report
        .iter()
        .filter(|(_, deployment)| matches!(deployment, GuildDeployment::Failed(_)))
        .count();
    if failed > 0 {
        tracing::warn!("Command deployment failed for {} of {} guilds", failed, report.len());
    }

    start_bot(state, log.take_mirror()).await
}
