//! Text shortening helpers for user-facing messages
//!
//! Notifications and terminal output never show full engine diagnostics or
//! full selections; these helpers cut text on character boundaries so
//! multi-byte UTF-8 is never split.

/// Maximum length of an engine diagnostic shown to the user
pub const DIAGNOSTIC_CHARS: usize = 100;

/// Default length of the "Reading..." notification preview
pub const PREVIEW_CHARS: usize = 50;

/// First `max_chars` characters of `text`, followed by `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Bounded prefix of a diagnostic, trimmed, without an ellipsis
pub fn excerpt(diagnostic: &str, max_chars: usize) -> String {
    diagnostic.trim().chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_text_preview() {
        let text = "A".repeat(100);
        let p = preview(&text, 50);
        assert_eq!(p.len(), 53);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_short_text_preview() {
        let p = preview("Short text", 50);
        assert_eq!(p, "Short text");
        assert!(!p.ends_with("..."));
    }

    #[test]
    fn test_preview_multibyte() {
        let p = preview("日本語のテキスト", 3);
        assert_eq!(p, "日本語...");
    }

    #[test]
    fn test_excerpt_bounds_length() {
        let diagnostic = format!("  {}  ", "x".repeat(500));
        let e = excerpt(&diagnostic, DIAGNOSTIC_CHARS);
        assert_eq!(e.chars().count(), 100);
        assert_eq!(excerpt("  short error\n", DIAGNOSTIC_CHARS), "short error");
    }
}
