//! Markdown and text formatting helpers for Discord messages.

use chrono::{DateTime, Utc};

/// Style of a Discord dynamic timestamp (`<t:...:style>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    /// Short time, e.g. `16:20`.
    ShortTime,
    /// Relative time, e.g. `2 hours ago`.
    Relative,
}

impl TimestampStyle {
    fn as_str(self) -> &'static str {
        match self {
            TimestampStyle::ShortTime => "t",
            TimestampStyle::Relative => "R",
        }
    }
}

/// Wraps a string in a Markdown code block.
///
/// # Arguments
/// - `content` - Text to wrap
/// - `language` - Code block language tag, may be empty
pub fn wrap_code_block(content: &str, language: &str) -> String {
    format!("```{}\n{}\n```", language, content)
}

/// Extracts the content of a Markdown code block.
///
/// Text that is not a code block is returned unchanged. The language tag on the
/// opening fence is discarded.
pub fn unwrap_code_block(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_fence) = trimmed.strip_prefix("```") else {
        return raw;
    };
    let Some((_, body)) = after_fence.split_once('\n') else {
        return raw;
    };

    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// Formats a byte count as a human readable size with SI units, e.g. `1.5 kB`.
///
/// Values are shown with three significant digits and trailing zeros removed.
pub fn format_filesize(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["kB", "MB", "GB", "TB", "PB"];

    if bytes < 1000 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1000.0 {
            break;
        }
        value /= 1000.0;
        unit = next;
    }

    let integer_digits = (value.log10().floor() as i32 + 1).max(1);
    let decimals = (3 - integer_digits).max(0) as usize;
    let mut number = format!("{:.*}", decimals, value);
    if number.contains('.') {
        number = number.trim_end_matches('0').trim_end_matches('.').to_string();
    }

    format!("{} {}", number, unit)
}

/// Formats a game duration as `m:ss`, or `h:mm:ss` for durations of an hour or more.
///
/// There is no leading zero on the first component, e.g. 625000 ms is `10:25`.
pub fn format_game_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Returns a Discord dynamic timestamp that each client renders in its own locale.
pub fn format_dynamic_timestamp(date: DateTime<Utc>, style: TimestampStyle) -> String {
    format!("<t:{}:{}>", date.timestamp(), style.as_str())
}

/// Returns a mention of a Discord user.
pub fn format_user_reference(user_id: u64) -> String {
    format!("<@{}>", user_id)
}

/// Appends `s` to a noun unless the count is exactly one.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    }
}
