//! Application state shared by the event handler, the dispatchers and all modules.
//!
//! The state is built once at the end of initialization and cloned into every
//! module invocation. All fields are cheap to clone.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    config::{Config, Paths},
    module::registry::ModuleRegistry,
    service::{map_image::MapRenderer, replay::ReplayParser, twitch::StreamStatusProvider},
};

/// Clients for external collaborators.
#[derive(Clone)]
pub struct Services {
    /// HTTP client for Twitch and attachment downloads.
    pub http_client: reqwest::Client,

    /// Live stream status source, backed by the Twitch API.
    pub streams: Arc<dyn StreamStatusProvider>,

    /// Replay parser. Replays are not processed when it is not configured.
    pub replay_parser: Option<Arc<dyn ReplayParser>>,

    /// Map image renderer. Replay replies go without an image when it is not
    /// configured.
    pub map_renderer: Option<Arc<dyn MapRenderer>>,
}

/// Application state containing shared resources and dependencies.
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded from `config.json`, read-only.
    pub config: Arc<Config>,

    /// Config and cache directories.
    pub paths: Paths,

    /// All loaded commands, message handlers and tasks.
    pub registry: Arc<ModuleRegistry>,

    pub services: Services,

    /// Time the bot finished initializing.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates a new application state with the provided dependencies.
    ///
    /// # Arguments
    /// - `config` - Parsed configuration
    /// - `paths` - Config and cache directories
    /// - `registry` - Loaded modules
    /// - `services` - External service clients
    ///
    /// # Returns
    /// - `AppState` - Initialized application state ready for use
    pub fn new(config: Config, paths: Paths, registry: ModuleRegistry, services: Services) -> Self {
        Self {
            config: Arc::new(config),
            paths,
            registry: Arc::new(registry),
            services,
            started_at: Utc::now(),
        }
    }
}
