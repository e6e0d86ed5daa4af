//! Small helpers for log formatting and oracle-response cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte
/// count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// When an oracle response is cut off mid-object, parsing fails with an
/// EOF error rather than a syntax error.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Strip a markdown code fence the oracle may wrap its JSON answer in.
///
/// Removes any ```` ```json ```` / ```` ``` ```` markers and trims. Safe on
/// responses that were never fenced.
pub fn strip_code_fence(s: &str) -> String {
    s.replace("```json", "").replace("```", "").trim().to_string()
}

/// Drop HTML tags from a feed summary, leaving the text between them.
pub fn strip_html_tags(s: &str) -> String {
    HTML_TAG.replace_all(s, "").trim().to_string()
}
