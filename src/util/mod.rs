//! Small helpers shared across the bot.

pub mod format;
pub mod lock;
pub mod roles;
pub mod settings;
