//! Shared utilities for `bugdesk`.
//!
//! - Credential hashing (Argon2id)
//! - Fixed-offset clock and date parsing
//! - Text helpers for audit snippets

mod hash;
pub mod time;

pub use hash::{hash_password, verify_password};
pub use time::{TrackerClock, format_date, parse_due_date, parse_offset};

/// Truncate `text` to at most `max_chars` characters, appending `...` when
/// anything was cut.
///
/// Counts Unicode scalar values, so multi-byte text is never split mid-char.
#[must_use]
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_short_text_unchanged() {
        assert_eq!(snippet("short", 50), "short");
        assert_eq!(snippet("", 50), "");
    }

    #[test]
    fn test_snippet_exact_length_unchanged() {
        let text = "a".repeat(50);
        assert_eq!(snippet(&text, 50), text);
    }

    #[test]
    fn test_snippet_truncates_with_ellipsis() {
        let text = "b".repeat(51);
        assert_eq!(snippet(&text, 50), format!("{}...", "b".repeat(50)));
    }

    #[test]
    fn test_snippet_counts_chars_not_bytes() {
        let text = "é".repeat(60);
        let cut = snippet(&text, 50);
        assert_eq!(cut.chars().count(), 53);
        assert!(cut.starts_with(&"é".repeat(50)));
    }
}
