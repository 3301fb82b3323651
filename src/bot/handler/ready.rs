//! Ready event handler.
//!
//! The ready event fires after the gateway handshake, and again after a full
//! reconnect. Starting the log forwarder and the periodic tasks is guarded so that
//! both happen only once.

use serenity::all::{Context, Ready};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;

use crate::{
    bot::log_channel, module::ModuleContext, scheduler::queue_tasks, state::AppState,
};

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `state` - Application state
/// - `log_mirror` - Mirrored log lines, taken by the first call
/// - `ctx` - Discord context
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(
    state: &AppState,
    log_mirror: &Mutex<Option<UnboundedReceiver<String>>>,
    ctx: Context,
    ready: Ready,
) {
    tracing::info!(
        "{} is connected to Discord ({} guilds)",
        ready.user.tag(),
        ready.guilds.len()
    );

    if let Some(channel_id) = state.config.discord.log_channel_id {
        if let Some(lines) = log_mirror.lock().await.take() {
            log_channel::spawn_forwarder(ctx.http.clone(), channel_id, lines);
        }
    }

    let module_ctx = ModuleContext::new(state.clone(), ctx.http.clone(), ready.user.id);
    let queued = queue_tasks(state.registry.tasks(), &module_ctx);
    if !queued.is_empty() {
        tracing::info!("Queued {} periodic tasks", queued.len());
    }
}
