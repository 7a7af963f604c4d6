/// Text processing utilities shared across pipeline stages
pub mod text {
    /// Truncate to at most `max_chars` characters without splitting a
    /// multi-byte character.
    pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Truncate with an ellipsis marker when the text was shortened
    pub fn preview(text: &str, max_chars: usize) -> String {
        if text.chars().count() > max_chars {
            format!("{}...", truncate_chars(text, max_chars))
        } else {
            text.to_string()
        }
    }

    /// Collapse all runs of whitespace into single spaces
    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Build a filesystem-safe file stem from a topic string
pub fn sanitize_filename(topic: &str) -> String {
    topic
        .replace(' ', "_")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_leaves_short_text_alone() {
        assert_eq!(text::preview("short", 100), "short");
    }

    #[test]
    fn preview_appends_ellipsis() {
        let long = "a".repeat(120);
        let preview = text::preview(&long, 100);
        assert_eq!(preview.len(), 103);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "héllo wörld";
        assert_eq!(text::truncate_chars(text, 4), "héll");
    }

    #[test]
    fn sanitize_strips_punctuation() {
        assert_eq!(
            sanitize_filename("GPT-5 Rumors: What's Next?"),
            "gpt-5_rumors_whats_next"
        );
    }

    #[test]
    fn collapse_whitespace_flattens_newlines() {
        assert_eq!(
            text::collapse_whitespace("a\n b\t\tc   d"),
            "a b c d"
        );
    }
}
