//! Text handling at the chat-platform edge

use once_cell::sync::Lazy;
use regex::Regex;

static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"<@!?\d+>").expect("valid mention regex"));

/// Remove user-mention tokens such as `<@123>` or `<@!123>` and trim
pub fn strip_mentions(text: &str) -> String {
    MENTION.replace_all(text, "").trim().to_string()
}

/// Query to hand to the agent; blank input becomes `default`
pub fn normalize_query(text: &str, default: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Truncate a reply to at most `max_chars` characters
pub fn clip_reply(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
