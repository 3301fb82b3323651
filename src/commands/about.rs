use chrono::{TimeDelta, Utc};
use serenity::async_trait;

use crate::{
    error::AppError,
    model::interaction::{CommandReply, Invocation},
    module::{Command, Manifest, ModuleContext},
    util::format::plural,
    VERSION,
};

/// `/about`: version, uptime and loaded modules, visible only to the caller.
pub struct About;

#[async_trait]
impl Command for About {
    fn manifest(&self) -> Option<Manifest> {
        Some(Manifest::new(
            "about",
            "Shows the bot's version and uptime.",
        ))
    }

    async fn execute(
        &self,
        _invocation: &Invocation,
        ctx: &ModuleContext,
    ) -> Result<CommandReply, AppError> {
        let counts = ctx.state.registry.counts();
        let uptime = format_uptime(Utc::now() - ctx.state.started_at);

        Ok(CommandReply::ephemeral(format!(
            "**HydraBot** v{}\nUp for {}.\nLoaded {} {}, {} message {} and {} {}.",
            VERSION,
            uptime,
            counts.commands,
            plural(counts.commands, "command"),
            counts.handlers,
            plural(counts.handlers, "handler"),
            counts.tasks,
            plural(counts.tasks, "task"),
        )))
    }
}

/// Formats a duration as days, hours and minutes, leaving out leading zero units.
fn format_uptime(uptime: TimeDelta) -> String {
    let minutes = uptime.num_minutes().max(0);
    let (days, hours, minutes) = (minutes / 1440, minutes / 60 % 24, minutes % 60);

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
