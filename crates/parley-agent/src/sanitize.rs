//! Removal of the service's internal citation markers from assistant text.
//!
//! Retrieval-backed assistants embed source citations such as `【4:0†source】`
//! in their replies. They reference files the end user cannot see, so they
//! are stripped before display.

use std::sync::OnceLock;

use regex::Regex;

/// Opening glyph of a citation marker.
pub const CITATION_OPEN: char = '【';

/// Closing glyph of a citation marker.
pub const CITATION_CLOSE: char = '】';

fn citation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Non-greedy and line-bounded: `.` does not match `\n`.
    PATTERN.get_or_init(|| Regex::new("【.*?】").expect("citation pattern is valid"))
}

/// Strip every citation marker from `text`.
///
/// Everything outside a `【…】` pair is preserved, including ordinary square
/// brackets and unpaired glyphs. Idempotent.
pub fn sanitize(text: &str) -> String {
    if !text.contains(CITATION_OPEN) {
        return text.to_string();
    }
    citation_pattern().replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        for text in [
            "",
            "Hello, world",
            "Use [brackets] and (parens) freely",
            "Fullwidth 「quotes」 are not citations",
            "multi\nline\ntext",
        ] {
            assert_eq!(sanitize(text), text);
        }
    }

    #[test]
    fn test_removes_single_marker() {
        assert_eq!(sanitize("Sample【25†source】"), "Sample");
    }

    #[test]
    fn test_removes_every_marker_non_greedy() {
        let text = "Reset the device【4:0†manual.pdf】, then wait 30s【4:1†faq.md】.";
        assert_eq!(sanitize(text), "Reset the device, then wait 30s.");
    }

    #[test]
    fn test_keeps_unpaired_glyphs() {
        assert_eq!(sanitize("open 【 only"), "open 【 only");
        assert_eq!(sanitize("close 】 only"), "close 】 only");
    }

    #[test]
    fn test_marker_does_not_span_lines() {
        let text = "line one 【\nline two】";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn test_nested_open_glyph() {
        // The leftmost open glyph starts the match; the stray close survives.
        assert_eq!(sanitize("a【b【c】d】e"), "ad】e");
    }

    #[test]
    fn test_idempotent() {
        for text in [
            "Sample【25†source】",
            "a【b【c】d】e",
            "【】【x】】【",
            "no markers at all",
        ] {
            let once = sanitize(text);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn test_result_contains_no_complete_marker() {
        let cleaned = sanitize("x【1】y【2†a】z【3†b】");
        assert_eq!(cleaned, "xyz");
        assert!(!citation_pattern().is_match(&cleaned));
    }
}
