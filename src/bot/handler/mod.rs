use serenity::all::{Context, EventHandler, Interaction, Message, Ready};
use serenity::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;

use crate::state::AppState;

pub mod interaction;
pub mod message;
pub mod ready;

/// Discord bot event handler
pub struct Handler {
    pub state: AppState,
    /// Mirrored log lines, forwarded to the log channel once connected.
    pub log_mirror: Mutex<Option<UnboundedReceiver<String>>>,
}

impl Handler {
    pub fn new(state: AppState, log_mirror: Option<UnboundedReceiver<String>>) -> Self {
        Self {
            state,
            log_mirror: Mutex::new(log_mirror),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(&self.state, &self.log_mirror, ctx, ready).await;
    }

    /// Called when a message is sent in a channel
    async fn message(&self, ctx: Context, new_message: Message) {
        message::handle_message(&self.state, ctx, new_message).await;
    }

    /// Called when a user invokes a slash command
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        interaction::handle_interaction(&self.state, ctx, interaction).await;
    }
}

#[cfg(test)]
mod test;
