use std::sync::atomic::Ordering;
use std::sync::Mutex;

use serenity::all::{ChannelId, GuildId, InteractionId, MessageId, UserId};
use serenity::async_trait;
use test_utils::{builder::TestBuilder, error::TestError, factory};

use crate::{
    error::AppError,
    model::{
        interaction::{CommandReply, Invocation},
        message::IncomingMessage,
    },
    module::{registry::ModuleRegistry, Command, MessageHandler, ModuleContext},
    testing::{
        proxy_http, services, test_context, test_state, FakeCommand, FakeHandler, FakeStreams,
        Outcome, BOT_USER_ID,
    },
};


fn context(root: &std::path::Path, registry: ModuleRegistry) -> ModuleContext {
    let state = test_state(
        &factory::config::create_config(),
        root,
        registry,
        services(FakeStreams::default()),
    );
    test_context(state, proxy_http("http://127.0.0.1:9"))
}
