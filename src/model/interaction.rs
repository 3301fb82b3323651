use serenity::all::{
    CommandInteraction, CommandType, CreateEmbed, CreateInteractionResponseMessage, GuildId,
    InteractionId, UserId,
};

/// A slash command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub id: InteractionId,
    pub command_name: String,
    pub user_id: UserId,
    pub user_name: String,
    pub guild_id: Option<GuildId>,
    /// Only chat input (slash) commands are dispatched; context menu commands are not.
    pub is_chat_input: bool,
}

impl From<&CommandInteraction> for Invocation {
    fn from(interaction: &CommandInteraction) -> Self {
        Self {
            id: interaction.id,
            command_name: interaction.data.name.clone(),
            user_id: interaction.user.id,
            user_name: interaction.user.name.clone(),
            guild_id: interaction.guild_id,
            is_chat_input: interaction.data.kind == CommandType::ChatInput,
        }
    }
}

/// Reply to a command invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandReply {
    pub content: Option<String>,
    pub embeds: Vec<CreateEmbed>,
    /// Only visible to the invoking user.
    pub ephemeral: bool,
}

impl CommandReply {
    /// Creates a plain text reply visible to everyone.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Creates a plain text reply only the invoking user can see.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ephemeral: true,
            ..Self::default()
        }
    }

    /// Converts the reply into a Discord interaction response message.
    pub fn into_response(self) -> CreateInteractionResponseMessage {
        let mut response = CreateInteractionResponseMessage::new()
            .embeds(self.embeds)
            .ephemeral(self.ephemeral);
        if let Some(content) = self.content {
            response = response.content(content);
        }
        response
    }
}
