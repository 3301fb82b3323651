//! Built-in message handlers.

pub mod replay;

use crate::module::MessageHandler;

/// All built-in message handlers, in the order they run.
pub fn all() -> Vec<Box<dyn MessageHandler>> {
    vec![Box::new(replay::ReplayHandler)]
}
