//! Slash command dispatch.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serenity::all::{CommandInteraction, Context, CreateInteractionResponse, Http, Interaction};
use serenity::async_trait;
use tracing::Instrument;

use crate::{
    bot::sysmsg::{error_reply, unknown_command_reply},
    error::AppError,
    model::interaction::{CommandReply, Invocation},
    module::ModuleContext,
    scheduler::panic_message,
    state::AppState,
};

/// Sends the reply to an interaction.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    async fn respond(&self, reply: CommandReply) -> Result<(), AppError>;
}

/// Responds to a Discord command interaction.
pub struct DiscordResponder<'a> {
    pub http: &'a Http,
    pub interaction: &'a CommandInteraction,
}

#[async_trait]
impl InteractionResponder for DiscordResponder<'_> {
    async fn respond(&self, reply: CommandReply) -> Result<(), AppError> {
        let response = CreateInteractionResponse::Message(reply.into_response());
        self.interaction.create_response(self.http, response).await?;
        Ok(())
    }
}

/// How an interaction was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Not a chat input command.
    Ignored,
    UnknownCommand,
    Executed,
    /// The command failed and the error reply was sent instead.
    Failed,
}

/// Handles an interaction from the gateway.
pub async fn handle_interaction(state: &AppState, ctx: Context, interaction: Interaction) {
    let Interaction::Command(command) = interaction else {
        return;
    };

    let bot_user_id = ctx.cache.current_user().id;
    let module_ctx = ModuleContext::new(state.clone(), ctx.http.clone(), bot_user_id);
    let responder = DiscordResponder {
        http: &ctx.http,
        interaction: &command,
    };

    dispatch_interaction(&Invocation::from(&command), &responder, &module_ctx).await;
}

/// Runs the command an interaction names and sends its reply.
///
/// Commands are matched by exact name. An unknown name gets an ephemeral notice,
/// and a failing command gets an ephemeral reply with the error. Nothing is
/// retried.
///
/// # Arguments
/// - `invocation` - The command interaction
/// - `responder` - Sends the reply
/// - `ctx` - Module context
///
/// # Returns
/// - `InteractionOutcome` - What happened
pub async fn dispatch_interaction(
    invocation: &Invocation,
    responder: &dyn InteractionResponder,
    ctx: &ModuleContext,
) -> InteractionOutcome {
    if !invocation.is_chat_input {
        return InteractionOutcome::Ignored;
    }

    let Some(command) = ctx.state.registry.find_command(&invocation.command_name) else {
        send(responder, unknown_command_reply(invocation)).await;
        return InteractionOutcome::UnknownCommand;
    };

    let span = command.span.clone();
    span.in_scope(|| {
        tracing::info!(
            "Command {} used by user {} ({})",
            command.manifest.name,
            invocation.user_name,
            invocation.user_id
        )
    });

    let execute = command.command.execute(invocation, ctx).instrument(span);
    let result = match AssertUnwindSafe(execute).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(AppError::InternalError(panic_message(panic.as_ref()).to_string())),
    };

    match result {
        Ok(reply) => {
            send(responder, reply).await;
            InteractionOutcome::Executed
        }
        Err(e) => {
            send(responder, error_reply(invocation, &e)).await;
            InteractionOutcome::Failed
        }
    }
}

async fn send(responder: &dyn InteractionResponder, reply: CommandReply) {
    if let Err(e) = responder.respond(reply).await {
        tracing::warn!("Could not reply to interaction: {}", e);
    }
}
