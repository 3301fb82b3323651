//! Mirrors the bot's log output into a Discord channel.

use std::sync::Arc;

use serenity::all::{ChannelId, CreateMessage, Http};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::util::format::wrap_code_block;

/// Target of events emitted here. They are never mirrored themselves.
pub const TARGET: &str = module_path!();

/// Maximum length of the text inside one mirrored message, leaving room for the
/// code block fences within Discord's 2000 character limit.
const MAX_BATCH_LEN: usize = 1900;

/// Starts forwarding mirrored log lines to a channel.
///
/// Lines logged before the bot connected are sent first. Lines that arrive while a
/// message is being sent are combined into the next message.
pub fn spawn_forwarder(
    http: Arc<Http>,
    channel_id: ChannelId,
    lines: UnboundedReceiver<String>,
) -> JoinHandle<()> {
    let mut batches = LineBatcher::new(lines);

    tokio::spawn(async move {
        while let Some(batch) = batches.next_batch().await {
            let message = CreateMessage::new().content(wrap_code_block(&batch, ""));
            if let Err(e) = channel_id.send_message(&http, message).await {
                tracing::warn!("Could not send log lines to channel {}: {}", channel_id, e);
            }
        }
    })
}

/// Groups queued log lines into messages of bounded length.
pub(crate) struct LineBatcher {
    lines: UnboundedReceiver<String>,
    /// Line that did not fit into the previous batch.
    carry: Option<String>,
}

impl LineBatcher {
    pub(crate) fn new(lines: UnboundedReceiver<String>) -> Self {
        Self { lines, carry: None }
    }

    /// Waits for the next line and combines it with any lines already queued.
    ///
    /// Returns `None` once all senders are gone and nothing is left.
    pub(crate) async fn next_batch(&mut self) -> Option<String> {
        let first = match self.carry.take() {
            Some(line) => line,
            None => self.lines.recv().await?,
        };
        let mut batch = truncate(first);

        while let Ok(line) = self.lines.try_recv() {
            let line = truncate(line);
            if batch.len() + 1 + line.len() > MAX_BATCH_LEN {
                self.carry = Some(line);
                break;
            }
            batch.push('\n');
            batch.push_str(&line);
        }

        Some(batch)
    }
}

fn truncate(mut line: String) -> String {
    if line.len() > MAX_BATCH_LEN {
        let mut end = MAX_BATCH_LEN;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        line.truncate(end);
    }
    line
}
