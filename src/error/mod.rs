//! Error types for the bot.
//!
//! `AppError` is the top-level error type. It wraps the domain-specific errors of
//! each concern (configuration, cache, instance lock, Twitch, replay parsing) and the
//! errors of the third-party clients the bot talks to. Only startup failures are
//! fatal; everything that happens once the bot is connected is logged and isolated
//! by the caller.

pub mod cache;
pub mod config;
pub mod lock;
pub mod replay;
pub mod twitch;

use thiserror::Error;

use crate::error::{
    cache::CacheError, config::ConfigError, lock::LockError, replay::ReplayError,
    twitch::TwitchError,
};

/// Top-level application error type.
///
/// Most variants use `#[from]` for automatic conversion so that `?` can be used
/// across layers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration file missing or malformed. Fatal during startup.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Guild or token cache could not be read or written.
    #[error(transparent)]
    CacheErr(#[from] CacheError),

    /// Instance lock could not be acquired. Fatal during startup and reported
    /// distinctly from other startup errors.
    #[error(transparent)]
    LockErr(#[from] LockError),

    /// Twitch authentication or API error.
    #[error(transparent)]
    TwitchErr(#[from] TwitchError),

    /// Replay file could not be parsed.
    #[error(transparent)]
    ReplayErr(#[from] ReplayError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// HTTP client request error from reqwest.
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),

    /// Filesystem or process I/O error outside of the cache and config stores.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// JSON (de)serialization error outside of the cache and config stores.
    #[error(transparent)]
    JsonErr(#[from] serde_json::Error),

    /// Internal error with custom message.
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Returns whether this error means another instance holds the cache directory.
    pub fn is_lock_held(&self) -> bool {
        matches!(self, AppError::LockErr(LockError::Held { .. }))
    }
}
