//! Logging setup.
//!
//! Log lines go to stdout through `tracing-subscriber`, with UTC timestamps that
//! include the date only when `logging.includeDates` is set. `RUST_LOG` overrides
//! the default filter.
//!
//! The bot's own INFO, WARN and ERROR events are additionally copied into a
//! channel. Once the bot is connected, [`crate::bot::log_channel`] drains that
//! channel into the Discord log channel, if one is configured. Until then the
//! lines are buffered.

use std::fmt::Write;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{field::Field, field::Visit, Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::time::ChronoUtc, layer::Context, prelude::*, EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "hydrabot=info,warn";

/// Root target of all events emitted by the bot itself.
const BOT_TARGET: &str = "hydrabot";

/// Logging state created at startup and handed to the bot.
pub struct LogContext {
    pub include_dates: bool,
    mirror: Option<UnboundedReceiver<String>>,
}

impl LogContext {
    /// Takes the receiving end of the log mirror.
    ///
    /// Returns `None` after the first call.
    pub fn take_mirror(&mut self) -> Option<UnboundedReceiver<String>> {
        self.mirror.take()
    }
}

/// Returns the timestamp format for log lines.
pub fn timestamp_format(include_dates: bool) -> &'static str {
    if include_dates {
        "%Y-%m-%d %H:%M:%SZ"
    } else {
        "%H:%M:%SZ"
    }
}

/// Installs the global subscriber.
///
/// # Arguments
/// - `config` - Logging section of the config
/// - `mirror` - Whether to copy the bot's log lines for a Discord log channel
///
/// # Returns
/// - `LogContext` - Logging state; holds the mirror receiver if requested
pub fn init(config: &LoggingConfig, mirror: bool) -> LogContext {
    let (mirror_layer, receiver) = if mirror {
        let (layer, receiver) = MirrorLayer::new();
        (Some(layer), Some(receiver))
    } else {
        (None, None)
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let timer = ChronoUtc::new(timestamp_format(config.include_dates).to_string());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_timer(timer))
        .with(mirror_layer)
        .try_init();
    if installed.is_err() {
        tracing::debug!("Global subscriber already set");
    }

    LogContext {
        include_dates: config.include_dates,
        mirror: receiver,
    }
}

/// Copies the bot's INFO and more severe events into a channel as plain text.
pub struct MirrorLayer {
    sender: UnboundedSender<String>,
}

impl MirrorLayer {
    pub fn new() -> (Self, UnboundedReceiver<String>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl<S: Subscriber> Layer<S> for MirrorLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > Level::INFO {
            return;
        }
        let target = metadata.target();
        if !target.starts_with(BOT_TARGET) || target == crate::bot::log_channel::TARGET {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let text = format!("{}{}", visitor.message, visitor.fields);

        let line = match *metadata.level() {
            Level::INFO => text,
            level => format!("{}: {}", level, text),
        };
        // A closed receiver only means nobody forwards the lines anymore.
        let _ = self.sender.send(line);
    }
}

/// Collects an event's message and its other fields.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
