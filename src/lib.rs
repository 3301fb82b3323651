//! HydraBot, a Discord bot for StarCraft communities.
//!
//! The bot is built from three kinds of modules: slash commands, message handlers
//! and periodic tasks. They are registered in a static [`module::registry`] and
//! driven by the Discord gateway events in [`bot::handler`] and the task loops in
//! [`scheduler`].

pub mod bot;
pub mod commands;
pub mod config;
pub mod data;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod module;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
pub mod tasks;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;

/// Version of the bot, as shown in the startup banner and by `/about`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
