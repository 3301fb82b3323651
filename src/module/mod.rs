//! Bot modules: slash commands, message handlers and periodic tasks.
//!
//! Every module implements one of the [`Command`], [`MessageHandler`] or [`Task`]
//! traits and describes itself with a [`Manifest`]. Built-in modules are listed in
//! `commands::all()`, `handlers::all()` and `tasks::all()` and validated by the
//! [`registry::ModuleRegistry`] at startup.

pub mod hash;
pub mod manifest;
pub mod registry;

use std::sync::Arc;

use serenity::all::{CreateCommand, Http, UserId};
use serenity::async_trait;

use crate::{
    error::AppError,
    model::{
        interaction::{CommandReply, Invocation},
        message::IncomingMessage,
    },
    state::AppState,
};

pub use manifest::{Manifest, ModuleKind};

/// Everything a module may use while running.
#[derive(Clone)]
pub struct ModuleContext {
    pub state: AppState,
    /// Discord REST client.
    pub http: Arc<Http>,
    /// The bot's own Discord user.
    pub bot_user_id: UserId,
}

impl ModuleContext {
    pub fn new(state: AppState, http: Arc<Http>, bot_user_id: UserId) -> Self {
        Self {
            state,
            http,
            bot_user_id,
        }
    }
}

/// A slash command.
#[async_trait]
pub trait Command: Send + Sync {
    /// Returns the manifest, or `None` if this command should not be loaded.
    fn manifest(&self) -> Option<Manifest>;

    /// Builds the definition deployed to Discord.
    ///
    /// Defaults to a command without options, named and described by the manifest.
    fn definition(&self, manifest: &Manifest) -> CreateCommand {
        CreateCommand::new(&manifest.name).description(&manifest.description)
    }

    /// Executes the command and returns the reply to send.
    async fn execute(
        &self,
        invocation: &Invocation,
        ctx: &ModuleContext,
    ) -> Result<CommandReply, AppError>;
}

/// Reacts to incoming messages.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Returns the manifest, or `None` if this handler should not be loaded.
    fn manifest(&self) -> Option<Manifest>;

    /// Returns whether the handler wants to process the message.
    ///
    /// Evaluated for every handler in registry order before any `handle` runs.
    async fn applies(&self, message: &IncomingMessage, ctx: &ModuleContext)
        -> Result<bool, AppError>;

    /// Processes a message this handler applies to.
    async fn handle(&self, message: &IncomingMessage, ctx: &ModuleContext) -> Result<(), AppError>;
}

/// Work that runs periodically for as long as the bot is connected.
#[async_trait]
pub trait Task: Send + Sync {
    /// Returns the manifest, or `None` if this task should not be loaded.
    ///
    /// Tasks without an interval are not loaded.
    fn manifest(&self) -> Option<Manifest>;

    /// Runs one cycle. `cycle` is 0 for the first run and increases by one each time.
    async fn run(&self, cycle: u64, ctx: &ModuleContext) -> Result<(), AppError>;
}

