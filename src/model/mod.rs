//! Value types passed between the Discord gateway and the bot's modules.
//!
//! Serenity's event payloads are converted into these types at the handler boundary.
//! Modules and dispatchers only see the fields they use, which keeps them testable
//! without a gateway connection.

pub mod interaction;
pub mod message;
