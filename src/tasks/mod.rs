//! Built-in periodic tasks.

pub mod livestreams;

use crate::module::Task;

/// All built-in tasks.
pub fn all() -> Vec<Box<dyn Task>> {
    vec![Box::new(livestreams::Livestreams::default())]
}
