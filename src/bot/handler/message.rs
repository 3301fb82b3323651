//! Message handler dispatch.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serenity::all::{Context, Message};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::{
    model::message::IncomingMessage,
    module::{registry::LoadedHandler, ModuleContext},
    scheduler::panic_message,
    state::AppState,
};

/// Handles a message posted in any channel the bot can see.
pub async fn handle_message(state: &AppState, ctx: Context, message: Message) {
    let bot_user_id = ctx.cache.current_user().id;
    let module_ctx = ModuleContext::new(state.clone(), ctx.http.clone(), bot_user_id);

    dispatch_message(&IncomingMessage::from(&message), &module_ctx).await;
}

/// Runs every message handler that applies to a message.
///
/// Messages from the bot itself and from other bots are ignored. `applies` is
/// evaluated for each handler in registry order; each handler that applies gets its
/// `handle` spawned as a separate tokio task and is not awaited. A failure or panic
/// in one handler, whether in `applies` or `handle`, is logged and never affects the
/// others.
///
/// # Arguments
/// - `message` - The incoming message
/// - `ctx` - Module context
///
/// # Returns
/// - Handles of the spawned `handle` calls, in registry order
pub async fn dispatch_message(
    message: &IncomingMessage,
    ctx: &ModuleContext,
) -> Vec<JoinHandle<()>> {
    if message.author_id == ctx.bot_user_id || message.author_is_bot {
        return Vec::new();
    }

    let mut spawned = Vec::new();
    for handler in ctx.state.registry.handlers() {
        let applies = handler
            .handler
            .applies(message, ctx)
            .instrument(handler.span.clone());

        match AssertUnwindSafe(applies).catch_unwind().await {
            Ok(Ok(true)) => {
                spawned.push(spawn_handle(handler.clone(), message.clone(), ctx.clone()))
            }
            Ok(Ok(false)) => {}
            Ok(Err(e)) => log_handler_error(message, &handler.manifest.name, &e.to_string()),
            Err(panic) => log_handler_error(
                message,
                &handler.manifest.name,
                panic_message(panic.as_ref()),
            ),
        }
    }

    spawned
}

fn spawn_handle(
    handler: Arc<LoadedHandler>,
    message: IncomingMessage,
    ctx: ModuleContext,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let handle = handler
            .handler
            .handle(&message, &ctx)
            .instrument(handler.span.clone());

        match AssertUnwindSafe(handle).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log_handler_error(&message, &handler.manifest.name, &e.to_string()),
            Err(panic) => log_handler_error(
                &message,
                &handler.manifest.name,
                panic_message(panic.as_ref()),
            ),
        }
    })
}

fn log_handler_error(message: &IncomingMessage, name: &str, error: &str) {
    tracing::warn!(
        "Message handler error (id={}, handler={}): {}",
        message.id,
        name,
        error
    );
}
