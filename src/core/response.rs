//! Discord message-limit utilities
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Truncate text to fit the message limit, adding ellipsis if needed
pub fn truncate_for_message(text: &str) -> String {
    if text.len() <= MESSAGE_LIMIT {
        return text.to_string();
    }
    // Find a safe UTF-8 boundary
    let mut end = MESSAGE_LIMIT - 3; // Room for "..."
    while !text.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Group lines into newline-joined batches of `per_batch` lines each
///
/// Used for replies that list many URLs: Discord unfurls each link, so
/// batches keep a single response from flooding the channel with one
/// message per link.
pub fn batch_lines(lines: &[String], per_batch: usize) -> Vec<String> {
    lines
        .chunks(per_batch.max(1))
        .map(|chunk| chunk.join("\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_for_message("hello"), "hello");
    }

    #[test]
    fn test_truncate_long_text() {
        let long = "a".repeat(MESSAGE_LIMIT + 50);
        let result = truncate_for_message(&long);
        assert_eq!(result.len(), MESSAGE_LIMIT);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_respects_utf8_boundary() {
        let long = "é".repeat(MESSAGE_LIMIT);
        let result = truncate_for_message(&long);
        assert!(result.len() <= MESSAGE_LIMIT);
        assert!(result.ends_with("..."));
        assert!(result.is_char_boundary(result.len() - 3));
    }

    #[test]
    fn test_batch_lines_groups_of_five() {
        let lines: Vec<String> = (0..12).map(|i| format!("url{i}")).collect();
        let batches = batch_lines(&lines, 5);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0], "url0\nurl1\nurl2\nurl3\nurl4");
        assert_eq!(batches[2], "url10\nurl11");
    }

    #[test]
    fn test_batch_lines_empty() {
        assert!(batch_lines(&[], 5).is_empty());
    }

    #[test]
    fn test_batch_lines_zero_batch_size_is_sane() {
        let lines = vec!["a".to_string()];
        assert_eq!(batch_lines(&lines, 0), vec!["a".to_string()]);
    }
}
