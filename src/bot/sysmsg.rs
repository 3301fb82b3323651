//! Replies the bot sends on its own behalf when a command cannot answer.

use crate::{
    error::AppError,
    model::interaction::{CommandReply, Invocation},
    util::format::wrap_code_block,
};

/// Builds the reply for an interaction naming a command that is not loaded.
pub fn unknown_command_reply(invocation: &Invocation) -> CommandReply {
    tracing::warn!(
        "Interaction yielded unknown command (id={}, name={})",
        invocation.id,
        invocation.command_name
    );
    CommandReply::ephemeral(format!(
        "Unknown command: **{}**.",
        invocation.command_name
    ))
}

/// Builds the reply for an interaction whose command failed.
///
/// The error text is shown to the invoking user in a code block.
pub fn error_reply(invocation: &Invocation, error: &AppError) -> CommandReply {
    let message = error.to_string();
    tracing::warn!("Interaction error (id={}): {}", invocation.id, message);
    CommandReply::ephemeral(format!(
        "An error occurred while handling this interaction.\n{}",
        wrap_code_block(&message, "")
    ))
}
