//! Built-in slash commands.

pub mod about;

use crate::module::Command;

/// All built-in commands, in load order.
pub fn all() -> Vec<Box<dyn Command>> {
    vec![Box::new(about::About)]
}
