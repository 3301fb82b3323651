//! Discord side of the bot: gateway events, command deployment and the messages
//! the bot maintains.

pub mod deploy;
pub mod handler;
pub mod log_channel;
pub mod start;
pub mod static_message;
pub mod sysmsg;
